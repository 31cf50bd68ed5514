//! AWS SDK S3 backend.
//!
//! The only backend that applies canned ACLs and creates buckets.

mod backend;
mod config;

pub use backend::S3Backend;
pub use config::{DEFAULT_REGION, S3Config};
