//! Canned-response fetcher.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{FetchError, Result, TRACING_TARGET, UriFetcher, parse_uri};

#[derive(Debug, Clone)]
enum MockResponse {
    Body(String),
    Status(u16),
}

/// Fetcher answering from a fixed table of responses.
///
/// Unknown URIs answer with status 404. Every requested URI is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Creates a fetcher with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `uri` with status 200 and `body`.
    #[must_use]
    pub fn with_body(mut self, uri: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses
            .insert(uri.into(), MockResponse::Body(body.into()));
        self
    }

    /// Answers `uri` with `status` and no body.
    #[must_use]
    pub fn with_status(mut self, uri: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(uri.into(), MockResponse::Status(status));
        self
    }

    /// Returns the URIs requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl UriFetcher for MockFetcher {
    async fn fetch(&self, uri: &str) -> Result<String> {
        parse_uri(uri)?;
        self.requests.lock().await.push(uri.to_owned());

        tracing::debug!(target: TRACING_TARGET, uri, "Serving canned response");

        match self.responses.get(uri) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => Err(FetchError::Status { status: *status }),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses() {
        let fetcher = MockFetcher::new()
            .with_body("https://example.com/ok", "hello")
            .with_status("https://example.com/gone", 410);

        assert_eq!(fetcher.fetch("https://example.com/ok").await.unwrap(), "hello");
        assert_eq!(
            fetcher.fetch("https://example.com/gone").await.unwrap_err().status(),
            Some(410)
        );
        assert_eq!(
            fetcher.fetch("https://example.com/other").await.unwrap_err().status(),
            Some(404)
        );
        assert_eq!(fetcher.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn test_rejects_invalid_uri() {
        let fetcher = MockFetcher::new();
        assert!(fetcher.fetch("nope").await.is_err());
        assert!(fetcher.requests().await.is_empty());
    }
}
