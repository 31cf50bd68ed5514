//! Convenient re-exports for common use.

#[cfg(feature = "opendal")]
pub use crate::opendal::{BackendType, OpendalBackend, OpendalConfig};
#[cfg(feature = "s3")]
pub use crate::s3::{S3Backend, S3Config};
pub use crate::{
    Acl, ListPage, ListRequest, MemoryBackend, ObjectBackend, ObjectEntry, ObjectLister,
    StorageError, StorageResult,
};
