use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Image fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Query feature vector is empty")]
    EmptyQuery,

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Error categories surfaced to boundary layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidImage,
    DownloadFailed,
    Timeout,
    AccessDenied,
    DimensionMismatch,
    EmptyQuery,
    Catalog,
    Io,
    Serialization,
    InvalidConfig,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidImage(_) => ErrorKind::InvalidImage,
            Error::DownloadFailed(_) => ErrorKind::DownloadFailed,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::AccessDenied(_) => ErrorKind::AccessDenied,
            Error::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Error::EmptyQuery => ErrorKind::EmptyQuery,
            Error::Catalog(_) => ErrorKind::Catalog,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Per-candidate failures that are absorbed by substituting a fallback vector
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidImage
                | ErrorKind::DownloadFailed
                | ErrorKind::Timeout
                | ErrorKind::AccessDenied
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// `{kind, message}` pair handed to whatever transport wraps the engine
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}
