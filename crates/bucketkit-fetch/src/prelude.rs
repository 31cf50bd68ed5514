//! Convenient re-exports for common use.

#[cfg(feature = "test-utils")]
pub use crate::MockFetcher;
#[cfg(feature = "reqwest")]
pub use crate::reqwest::{FetchConfig, ReqwestFetcher};
pub use crate::{FetchError, UriFetcher};
