#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod listing;
mod options;
mod store;

#[doc(hidden)]
pub mod prelude;

pub use bucketkit_core::codec::Compression;
pub use bucketkit_core::path::StorageKey;
pub use bucketkit_core::{Record, Value};
pub use bucketkit_fetch::{FetchError, UriFetcher};
pub use bucketkit_storage::{
    Acl, MemoryBackend, ObjectBackend, ObjectEntry, ObjectLister, StorageError,
};
pub use config::{DEFAULT_REGION, StoreConfig};
pub use error::{Error, Result};
pub use listing::{DirectoryName, ListedObject};
pub use options::{SaveOptions, UriSaveOptions};
pub use store::ObjectStore;
pub use {bucketkit_core, bucketkit_fetch, bucketkit_storage};

/// Tracing target for object store operations.
pub const TRACING_TARGET: &str = "bucketkit";
