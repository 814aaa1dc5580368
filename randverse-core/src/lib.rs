use std::sync::Arc;

use rand::Rng;
use tracing::{debug, instrument};

pub mod catalog;
pub mod error;
pub mod extract;
pub mod messages;
pub mod provider;
pub mod select;

pub use catalog::{
    label, resource_name, Book, BookId, Catalog, Category, CategoryEntry, CategorySpec,
    DEFAULT_CATEGORIES, LABEL_SEPARATOR, MAX_LINE_COUNT,
};
pub use error::{ErrorKind, Result, VerseError};
pub use extract::{extract, BookReader, VerseLine, VerseReader};
pub use messages::{fill_placeholders, Messages};
pub use provider::{CorpusProvider, MemoryCorpus};
pub use select::{checked_total_lines, locate, select, total_lines, Selection};

/// Entry point tying the catalog to the corpus content.
#[derive(Clone)]
pub struct VersePicker {
    catalog: Arc<Catalog>,
    corpus: Arc<dyn CorpusProvider>,
}

/// A selected verse together with the lazy stream of it and the lines that
/// follow it in the book.
pub struct VersePick<'a> {
    pub book: &'a Book,
    pub offset: usize,
    pub verses: VerseReader,
}

impl VersePick<'_> {
    pub fn book_name(&self) -> &str {
        &self.book.name
    }

    pub fn total_lines(&self) -> usize {
        self.book.line_count
    }
}

impl VersePicker {
    pub fn new(catalog: Arc<Catalog>, corpus: Arc<dyn CorpusProvider>) -> Self {
        Self { catalog, corpus }
    }

    /// Loads the catalog from the corpus index. Fails only on errors that
    /// should abort startup.
    pub fn open(corpus: Arc<dyn CorpusProvider>, categories: &[CategorySpec]) -> Result<Self> {
        let catalog = Catalog::load(corpus.as_ref(), categories)?;
        Ok(Self::new(Arc::new(catalog), corpus))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn messages(&self) -> &Messages {
        self.catalog.messages()
    }

    pub fn list_categories(&self) -> Vec<CategoryEntry> {
        self.catalog.list_categories()
    }

    pub fn is_valid_category(&self, key: &str) -> bool {
        self.catalog.is_valid_category(key)
    }

    /// Picks a random line from the whole corpus, or from `category` when it
    /// is non-empty, and opens its book positioned at that line.
    #[instrument(skip(self, rng))]
    pub fn select_verse<R>(&self, category: Option<&str>, rng: &mut R) -> Result<VersePick<'_>>
    where
        R: Rng + ?Sized,
    {
        let pool = self.catalog.pool(category)?;
        let Selection { book, offset } = select(pool, rng)?;
        debug!(book = %book.name, offset, total = book.line_count, "selected verse");
        let verses = extract(self.corpus.as_ref(), book, offset)?;
        Ok(VersePick {
            book,
            offset,
            verses,
        })
    }
}
