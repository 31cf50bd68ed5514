//! Convenient re-exports for common use.

pub use crate::{
    Compression, DirectoryName, Error, ListedObject, ObjectBackend, ObjectStore, Record, Result,
    SaveOptions, StoreConfig, UriFetcher, UriSaveOptions, Value,
};
