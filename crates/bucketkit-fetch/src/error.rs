//! Fetch error types.

/// Result type alias for fetch operations.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Errors raised while fetching a remote URI.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URI could not be parsed or uses an unsupported scheme.
    #[error("invalid uri '{uri}': {reason}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The server answered with a status other than 200.
    #[error("status code is {status}.")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other fetcher-specific failure.
    #[error("fetch failed: {0}")]
    Other(String),
}

impl FetchError {
    /// Creates a new invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the HTTP status for [`FetchError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}
