#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod error;
mod lister;
mod memory;

#[cfg(feature = "opendal")]
#[cfg_attr(docsrs, doc(cfg(feature = "opendal")))]
pub mod opendal;

#[cfg(feature = "s3")]
#[cfg_attr(docsrs, doc(cfg(feature = "s3")))]
pub mod s3;

#[doc(hidden)]
pub mod prelude;

pub use backend::{Acl, DEFAULT_PAGE_SIZE, ListPage, ListRequest, ObjectBackend, ObjectEntry};
pub use error::{BoxedError, StorageError, StorageResult};
pub use lister::ObjectLister;
pub use memory::{MemoryBackend, StoredObject};

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "bucketkit_storage";
