use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use randverse_core::CorpusProvider;
use tracing::{instrument, warn};

pub mod pack;

pub use pack::{pack, BookEntry, Manifest, PackError, PackReport};

pub const INDEX_FILE: &str = "index.txt";

/// Corpus laid out on disk: `index.txt` next to one `<id>.txt.gz` per book.
#[derive(Debug, Clone)]
pub struct DirCorpus {
    root: PathBuf,
}

impl DirCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resource_path(&self, resource: &str) -> io::Result<PathBuf> {
        let name = Path::new(resource);
        // resources are flat file names inside the corpus root
        if name.components().count() != 1 || name.file_name().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid resource name {resource:?}"),
            ));
        }
        Ok(self.root.join(name))
    }
}

impl CorpusProvider for DirCorpus {
    #[instrument(skip(self), fields(root = ?self.root))]
    fn read_index(&self) -> io::Result<String> {
        let path = self.root.join(INDEX_FILE);
        fs::read_to_string(&path).map_err(|err| {
            warn!(?path, %err, "failed to read corpus index");
            err
        })
    }

    fn open(&self, resource: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = self.resource_path(resource)?;
        let file = File::open(&path)?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randverse_core::{Catalog, ErrorKind, DEFAULT_CATEGORIES};
    use tempfile::tempdir;

    #[test]
    fn missing_directory_is_missing_index() {
        let dir = tempdir().unwrap();
        let corpus = DirCorpus::new(dir.path().join("nope"));
        let err = Catalog::load(&corpus, &DEFAULT_CATEGORIES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingIndex);
    }

    #[test]
    fn reads_index_and_opens_resources() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "10|Genesis|1\n").unwrap();
        fs::write(dir.path().join("10.txt.gz"), b"bytes").unwrap();

        let corpus = DirCorpus::new(dir.path());
        assert_eq!(corpus.read_index().unwrap(), "10|Genesis|1\n");
        let mut buf = Vec::new();
        corpus.open("10.txt.gz").unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"bytes");
        assert_eq!(
            corpus.open("20.txt.gz").err().unwrap().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn rejects_resources_outside_root() {
        let dir = tempdir().unwrap();
        let corpus = DirCorpus::new(dir.path());
        for name in ["../index.txt", "a/b.txt.gz", ""] {
            let err = corpus.open(name).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{name}");
        }
    }
}
