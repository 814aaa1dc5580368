use std::io;

use thiserror::Error;

/// Stable classification of [`VerseError`], used by presenters to pick the
/// message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingIndex,
    InvalidFrontmatter,
    MalformedRecord,
    InvalidCategory,
    EmptyPool,
    ContentOpen,
    Decompression,
}

#[derive(Debug, Error)]
pub enum VerseError {
    #[error("corpus index could not be read")]
    MissingIndex(#[source] io::Error),

    #[error("index frontmatter is invalid: {0}")]
    InvalidFrontmatter(String),

    #[error("index line {line} is malformed: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("book line counts overflow the selection range")]
    LineCountOverflow,

    #[error("unknown category {key:?}")]
    InvalidCategory { key: String },

    #[error("no verses available for the requested selection")]
    EmptyPool,

    #[error("failed to open book content {resource:?}")]
    ContentOpen {
        resource: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decompress book content {resource:?}")]
    Decompression {
        resource: String,
        #[source]
        source: io::Error,
    },
}

impl VerseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerseError::MissingIndex(_) => ErrorKind::MissingIndex,
            VerseError::InvalidFrontmatter(_) => ErrorKind::InvalidFrontmatter,
            VerseError::MalformedRecord { .. } | VerseError::LineCountOverflow => {
                ErrorKind::MalformedRecord
            }
            VerseError::InvalidCategory { .. } => ErrorKind::InvalidCategory,
            VerseError::EmptyPool => ErrorKind::EmptyPool,
            VerseError::ContentOpen { .. } => ErrorKind::ContentOpen,
            VerseError::Decompression { .. } => ErrorKind::Decompression,
        }
    }

    /// Whether the error ends the process rather than a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingIndex | ErrorKind::InvalidFrontmatter
        )
    }
}

pub type Result<T, E = VerseError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_startup_errors_are_fatal() {
        let missing = VerseError::MissingIndex(io::Error::from(io::ErrorKind::NotFound));
        assert!(missing.is_fatal());
        assert!(!VerseError::EmptyPool.is_fatal());
        assert!(!VerseError::InvalidCategory { key: "x".into() }.is_fatal());
        let open = VerseError::ContentOpen {
            resource: "10.txt.gz".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(open.kind(), ErrorKind::ContentOpen);
        assert!(!open.is_fatal());
    }
}
