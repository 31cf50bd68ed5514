//! OpenDAL-backed storage.
//!
//! OpenDAL has no notion of canned ACLs or bucket creation: public writes
//! are stored with the service default policy and only the configured
//! bucket can be addressed.

mod backend;
mod config;

pub use backend::OpendalBackend;
pub use config::{BackendType, OpendalConfig};
