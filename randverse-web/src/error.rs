//! Request error types with HTTP status mapping

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use randverse_core::{ErrorKind, Messages, VerseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    /// Unknown `narrow` value; carries the rendered accepted-values page
    #[error("invalid category {key:?}")]
    InvalidCategory { key: String, page: String },

    /// Selection or extraction failure, already mapped to a user message
    #[error("{message}")]
    Verse { kind: ErrorKind, message: String },

    /// The blocking extraction task panicked or was cancelled
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = WebError> = std::result::Result<T, E>;

impl WebError {
    pub fn from_verse(err: &VerseError, messages: &Messages) -> Self {
        let kind = err.kind();
        WebError::Verse {
            kind,
            message: messages.for_kind(kind).to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::InvalidCategory { .. } => StatusCode::BAD_REQUEST,
            WebError::Verse { kind, .. } => match kind {
                ErrorKind::InvalidCategory | ErrorKind::EmptyPool => StatusCode::BAD_REQUEST,
                ErrorKind::ContentOpen => StatusCode::NOT_FOUND,
                ErrorKind::Decompression
                | ErrorKind::MissingIndex
                | ErrorKind::InvalidFrontmatter
                | ErrorKind::MalformedRecord => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            WebError::InvalidCategory { page, .. } => (status, Html(page)).into_response(),
            WebError::Verse { message, .. } => (
                status,
                [("content-type", "text/plain; charset=utf-8")],
                format!("{message}\n"),
            )
                .into_response(),
            WebError::Task(err) => {
                tracing::error!(%err, "verse extraction task failed");
                (status, "internal error\n").into_response()
            }
        }
    }
}
