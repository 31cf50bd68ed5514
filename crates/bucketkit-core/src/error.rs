//! Core error types.

/// Result type for key construction and content transforms.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building keys or transforming payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed, empty or root-only logical path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Value cannot be written in a tabular format.
    #[error("tabular value must be a list of records or a single record, got {0}")]
    NotTabular(&'static str),

    /// Tabular writer or reader failure.
    #[error("tabular encoding failed: {0}")]
    Tabular(String),

    /// Gzip stream could not be produced or read.
    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// Structured value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new invalid path error.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Creates a new tabular encoding error.
    pub fn tabular(msg: impl std::fmt::Display) -> Self {
        Self::Tabular(msg.to_string())
    }

    /// Returns `true` for [`Error::InvalidPath`].
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath(_))
    }
}
