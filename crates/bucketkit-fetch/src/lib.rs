#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

#[doc(hidden)]
pub mod prelude;

pub use error::{FetchError, Result};
#[cfg(feature = "test-utils")]
pub use mock::MockFetcher;
use url::Url;

/// Tracing target for fetch operations.
pub const TRACING_TARGET: &str = "bucketkit_fetch";

/// Retrieves the body of a remote resource as text.
///
/// Implement this trait to plug a custom HTTP stack into the object store.
#[async_trait::async_trait]
pub trait UriFetcher: Send + Sync {
    /// Fetches `uri` and returns its body decoded as text.
    ///
    /// Any status other than 200 fails with [`FetchError::Status`].
    async fn fetch(&self, uri: &str) -> Result<String>;
}

/// Parses `uri`, accepting only `http` and `https` URLs.
pub fn parse_uri(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).map_err(|e| FetchError::invalid_uri(uri, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::invalid_uri(
            uri,
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}
