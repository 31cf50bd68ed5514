#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for key construction.
pub const TRACING_TARGET_PATH: &str = "bucketkit_core::path";

/// Tracing target for payload encoding and decoding.
pub const TRACING_TARGET_CODEC: &str = "bucketkit_core::codec";

/// Tracing target for cache envelope evaluation.
pub const TRACING_TARGET_CACHE: &str = "bucketkit_core::cache";

mod error;
mod value;

pub mod cache;
pub mod codec;
pub mod path;

#[doc(hidden)]
pub mod prelude;

pub use error::{Error, Result};
pub use value::{Record, Value};
