//! Object store error types.

use bucketkit_fetch::FetchError;
use bucketkit_storage::StorageError;

/// Result type for object store operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by [`ObjectStore`](crate::ObjectStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key construction or payload transform failed.
    #[error(transparent)]
    Core(#[from] bucketkit_core::Error),

    /// The storage backend failed.
    #[error(transparent)]
    Backend(#[from] StorageError),

    /// A remote resource could not be fetched.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(#[from] FetchError),
}

impl Error {
    /// Returns `true` when a logical path was rejected.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::Core(err) if err.is_invalid_path())
    }

    /// Returns `true` when the backend reported a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_not_found())
    }
}
