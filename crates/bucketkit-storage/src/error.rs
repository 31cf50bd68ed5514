//! Storage error types.

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Read operation failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Write operation failed.
    #[error("write failed: {0}")]
    Write(String),

    /// List operation failed.
    #[error("list failed: {0}")]
    List(String),

    /// Bucket lookup or creation failed.
    #[error("bucket operation failed: {0}")]
    Bucket(String),

    /// Operation not available on this backend.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(#[source] BoxedError),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Creates a new permission denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Creates a new read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Creates a new write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Creates a new list error.
    pub fn list(msg: impl Into<String>) -> Self {
        Self::List(msg.into())
    }

    /// Creates a new bucket error.
    pub fn bucket(msg: impl Into<String>) -> Self {
        Self::Bucket(msg.into())
    }

    /// Creates a new unsupported operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Wraps a backend-specific error.
    pub fn backend(err: impl Into<BoxedError>) -> Self {
        Self::Backend(err.into())
    }

    /// Returns `true` for [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(feature = "opendal")]
impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            ErrorKind::Unsupported => Self::Unsupported(err.to_string()),
            _ => Self::Backend(Box::new(err)),
        }
    }
}
