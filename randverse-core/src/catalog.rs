use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Result, VerseError};
use crate::messages::Messages;
use crate::provider::CorpusProvider;

pub type BookId = u32;

const FRONTMATTER_DELIMITER: &str = "---";

/// Largest line count accepted from an index record.
pub const MAX_LINE_COUNT: usize = u32::MAX as usize;

/// Separator between the first and last book names of a category label.
pub const LABEL_SEPARATOR: &str = " — ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub line_count: usize,
    pub resource: String,
}

impl Book {
    pub fn new(id: BookId, name: impl Into<String>, line_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            line_count,
            resource: resource_name(id),
        }
    }
}

/// Name of the compressed content for a book id.
pub fn resource_name(id: BookId) -> String {
    format!("{id}.txt.gz")
}

/// Category as written in configuration: an inclusive id range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub key: String,
    pub low: BookId,
    pub high: BookId,
}

impl CategorySpec {
    pub fn new(key: impl Into<String>, low: BookId, high: BookId) -> Self {
        Self {
            key: key.into(),
            low,
            high,
        }
    }
}

pub static DEFAULT_CATEGORIES: Lazy<Vec<CategorySpec>> = Lazy::new(|| {
    [
        ("ot", 10, 460),
        ("nt", 470, 730),
        ("pentateuch", 10, 50),
        ("historical", 60, 190),
        ("poetic", 220, 260),
        ("major", 290, 340),
        ("minor", 350, 460),
        ("gospels", 470, 500),
        ("apostolic", 510, 720),
        ("acts", 510, 510),
        ("paul", 520, 650),
        ("general", 660, 720),
        ("revelation", 730, 730),
    ]
    .into_iter()
    .map(|(key, low, high)| CategorySpec::new(key, low, high))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub low: BookId,
    pub high: BookId,
    pub label: String,
}

/// Key and label pair used to describe accepted category values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub key: String,
    pub label: String,
}

/// Immutable view over the corpus: books sorted by id, configured categories
/// and the message strings from the index frontmatter.
#[derive(Debug, Clone)]
pub struct Catalog {
    books: Vec<Book>,
    categories: Vec<Category>,
    messages: Messages,
}

impl Catalog {
    pub fn new(books: Vec<Book>, categories: &[CategorySpec], messages: Messages) -> Self {
        let mut books = books;
        books.sort_by_key(|book| book.id);
        books.dedup_by(|later, earlier| {
            let duplicate = later.id == earlier.id;
            if duplicate {
                warn!(id = later.id, name = %later.name, "dropping duplicate book id");
            }
            duplicate
        });

        let mut catalog = Self {
            books,
            categories: Vec::with_capacity(categories.len()),
            messages,
        };

        let mut seen = HashSet::new();
        for def in categories {
            if !seen.insert(def.key.as_str()) {
                warn!(key = %def.key, "dropping duplicate category key");
                continue;
            }
            let label = label(catalog.resolve(def.low, def.high));
            catalog.categories.push(Category {
                key: def.key.clone(),
                low: def.low,
                high: def.high,
                label,
            });
        }
        catalog
    }

    #[instrument(skip(provider, categories))]
    pub fn load(provider: &dyn CorpusProvider, categories: &[CategorySpec]) -> Result<Self> {
        let index = provider.read_index().map_err(VerseError::MissingIndex)?;
        let catalog = Self::parse(&index, categories)?;
        debug!(
            books = catalog.books.len(),
            categories = catalog.categories.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parses index text: optional YAML frontmatter, then `id|name|count`
    /// records. Malformed records are logged and skipped.
    pub fn parse(index: &str, categories: &[CategorySpec]) -> Result<Self> {
        let (messages, body, body_start) = split_frontmatter(index)?;

        let mut books = Vec::new();
        for (idx, line) in body.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(line, body_start + idx + 1) {
                Ok(book) => books.push(book),
                Err(err) => debug!(%err, "skipping index record"),
            }
        }

        Ok(Self::new(books, categories, messages))
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.key == key)
    }

    pub fn is_valid_category(&self, key: &str) -> bool {
        self.category(key).is_some()
    }

    pub fn list_categories(&self) -> Vec<CategoryEntry> {
        self.categories
            .iter()
            .map(|category| CategoryEntry {
                key: category.key.clone(),
                label: category.label.clone(),
            })
            .collect()
    }

    /// Books with `low <= id <= high`, in catalog order.
    pub fn resolve(&self, low: BookId, high: BookId) -> &[Book] {
        let mut start = None;
        let mut end = 0;
        for (idx, book) in self.books.iter().enumerate() {
            if book.id > high {
                break;
            }
            if book.id >= low {
                start.get_or_insert(idx);
                end = idx + 1;
            }
        }
        match start {
            Some(start) => &self.books[start..end],
            None => &[],
        }
    }

    /// Selection pool for a category key; `None` or an empty key means the
    /// whole catalog.
    pub fn pool(&self, category: Option<&str>) -> Result<&[Book]> {
        match category.filter(|key| !key.is_empty()) {
            None => Ok(&self.books),
            Some(key) => {
                let category = self
                    .category(key)
                    .ok_or_else(|| VerseError::InvalidCategory {
                        key: key.to_string(),
                    })?;
                Ok(self.resolve(category.low, category.high))
            }
        }
    }
}

/// Human-readable description of a run of books.
pub fn label(books: &[Book]) -> String {
    match books {
        [] => String::new(),
        [only] => only.name.clone(),
        [first, .., last] => format!("{}{}{}", first.name, LABEL_SEPARATOR, last.name),
    }
}

fn split_frontmatter(index: &str) -> Result<(Messages, &str, usize)> {
    let mut lines = index.split_inclusive('\n');
    let header_start = match lines.next() {
        Some(first) if first.trim_end() == FRONTMATTER_DELIMITER => first.len(),
        _ => {
            warn!("index has no frontmatter, using default messages");
            return Ok((Messages::default(), index, 0));
        }
    };

    let mut offset = header_start;
    for (idx, line) in lines.enumerate() {
        if line.trim_end() == FRONTMATTER_DELIMITER {
            let header = &index[header_start..offset];
            let body = &index[offset + line.len()..];
            let messages = if header.trim().is_empty() {
                Messages::default()
            } else {
                serde_yaml::from_str(header)
                    .map_err(|err| VerseError::InvalidFrontmatter(err.to_string()))?
            };
            // header lines plus both delimiters
            return Ok((messages, body, idx + 2));
        }
        offset += line.len();
    }

    Err(VerseError::InvalidFrontmatter(
        "frontmatter is not terminated".to_string(),
    ))
}

fn parse_record(line: &str, line_no: usize) -> Result<Book> {
    let malformed = |reason: String| VerseError::MalformedRecord {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let [id, name, count] = fields.as_slice() else {
        return Err(malformed(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    };
    let id: BookId = id
        .parse()
        .map_err(|err| malformed(format!("invalid id {id:?}: {err}")))?;
    let line_count: usize = count
        .parse()
        .map_err(|err| malformed(format!("invalid line count {count:?}: {err}")))?;
    if line_count > MAX_LINE_COUNT {
        return Err(malformed(format!(
            "line count {line_count} exceeds {MAX_LINE_COUNT}"
        )));
    }
    Ok(Book::new(id, *name, line_count))
}
