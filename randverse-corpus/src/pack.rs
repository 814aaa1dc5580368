//! Builds an on-disk corpus from plain-text books.
//!
//! The manifest is TOML with an optional `[messages]` table and one
//! `[[books]]` entry per book; source paths are relative to the manifest.
//! Every non-blank source line becomes one record in `<id>.txt.gz`.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use randverse_core::{Book, BookId, Messages};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::INDEX_FILE;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("failed to encode messages: {0}")]
    Messages(#[from] serde_yaml::Error),

    #[error("book id {0} appears more than once")]
    DuplicateId(BookId),

    #[error("book {id} has an invalid name {name:?}")]
    InvalidName { id: BookId, name: String },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PackError + '_ {
    move |source| PackError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub messages: Option<Messages>,
    pub books: Vec<BookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookEntry {
    pub id: BookId,
    pub name: String,
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PackReport {
    pub out_dir: PathBuf,
    pub books: Vec<Book>,
}

impl PackReport {
    pub fn total_lines(&self) -> usize {
        randverse_core::total_lines(&self.books)
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, PackError> {
        let raw = fs::read_to_string(path).map_err(io_err(path))?;
        Ok(toml::from_str(&raw)?)
    }

    fn validate(&self) -> Result<(), PackError> {
        let mut seen = HashSet::new();
        for entry in &self.books {
            if !seen.insert(entry.id) {
                return Err(PackError::DuplicateId(entry.id));
            }
            if entry.name.trim().is_empty() || entry.name.contains(['|', '\n', '\r']) {
                return Err(PackError::InvalidName {
                    id: entry.id,
                    name: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Packs every book listed in the manifest at `manifest_path` into `out_dir`.
#[instrument(skip_all, fields(manifest = ?manifest_path, out = ?out_dir))]
pub fn pack(manifest_path: &Path, out_dir: &Path) -> Result<PackReport, PackError> {
    let manifest = Manifest::load(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    pack_manifest(&manifest, base, out_dir)
}

pub fn pack_manifest(
    manifest: &Manifest,
    base: &Path,
    out_dir: &Path,
) -> Result<PackReport, PackError> {
    manifest.validate()?;
    fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

    let mut entries: Vec<&BookEntry> = manifest.books.iter().collect();
    entries.sort_by_key(|entry| entry.id);

    let mut books = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut book = Book::new(entry.id, entry.name.trim(), 0);
        let source = base.join(&entry.file);
        book.line_count = compress_book(&source, &out_dir.join(&book.resource))?;
        info!(id = book.id, name = %book.name, lines = book.line_count, "packed book");
        books.push(book);
    }

    let index_path = out_dir.join(INDEX_FILE);
    let index = render_index(manifest.messages.as_ref(), &books)?;
    fs::write(&index_path, index).map_err(io_err(&index_path))?;

    Ok(PackReport {
        out_dir: out_dir.to_path_buf(),
        books,
    })
}

/// Index text: YAML frontmatter when messages are given, then one
/// `id|name|count` record per book.
pub fn render_index(messages: Option<&Messages>, books: &[Book]) -> Result<String, PackError> {
    let mut out = String::new();
    if let Some(messages) = messages {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(messages)?);
        out.push_str("---\n");
    }
    for book in books {
        out.push_str(&format!("{}|{}|{}\n", book.id, book.name, book.line_count));
    }
    Ok(out)
}

fn compress_book(source: &Path, target: &Path) -> Result<usize, PackError> {
    let reader = BufReader::new(File::open(source).map_err(io_err(source))?);
    let file = File::create(target).map_err(io_err(target))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::best());

    let mut count = 0;
    for line in reader.lines() {
        let line = line.map_err(io_err(source))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        encoder.write_all(line.as_bytes()).map_err(io_err(target))?;
        encoder.write_all(b"\n").map_err(io_err(target))?;
        count += 1;
    }

    let mut writer = encoder.finish().map_err(io_err(target))?;
    writer.flush().map_err(io_err(target))?;
    Ok(count)
}
