//! Reqwest-based implementation of [`UriFetcher`](crate::UriFetcher).
//!
//! # Example
//!
//! ```rust,ignore
//! use bucketkit_fetch::reqwest::{FetchConfig, ReqwestFetcher};
//! use bucketkit_fetch::UriFetcher;
//!
//! let fetcher = ReqwestFetcher::new(FetchConfig::default())?;
//! let body = fetcher.fetch("https://example.com/").await?;
//! ```

mod client;
mod config;

pub use client::ReqwestFetcher;
pub use config::{DEFAULT_TIMEOUT_SECS, FetchConfig};

/// Tracing target for reqwest fetcher operations.
pub const TRACING_TARGET: &str = "bucketkit_fetch::reqwest";
