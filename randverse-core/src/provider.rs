use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use bytes::Bytes;
use parking_lot::RwLock;

/// Source of the corpus index and the gzip-compressed book contents.
pub trait CorpusProvider: Send + Sync {
    fn read_index(&self) -> io::Result<String>;
    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Corpus held entirely in memory, mostly useful for tests and embedding.
pub struct MemoryCorpus {
    index: RwLock<Option<String>>,
    resources: RwLock<HashMap<String, Bytes>>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self {
            index: RwLock::new(None),
            resources: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_index(index: impl Into<String>) -> Self {
        let corpus = Self::new();
        corpus.set_index(index);
        corpus
    }

    pub fn set_index(&self, index: impl Into<String>) {
        *self.index.write() = Some(index.into());
    }

    pub fn insert(&self, resource: impl Into<String>, content: impl Into<Bytes>) {
        self.resources.write().insert(resource.into(), content.into());
    }
}

impl Default for MemoryCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusProvider for MemoryCorpus {
    fn read_index(&self) -> io::Result<String> {
        self.index
            .read()
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "index not loaded"))
    }

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>> {
        let content = self.resources.read().get(resource).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no resource named {resource}"),
            )
        })?;
        Ok(Box::new(Cursor::new(content)))
    }
}
