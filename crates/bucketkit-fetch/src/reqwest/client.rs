//! Reqwest-based URI fetcher.

use std::sync::Arc;

use reqwest::{Client, StatusCode};

use super::{FetchConfig, TRACING_TARGET};
use crate::{FetchError, Result, UriFetcher, parse_uri};

struct ReqwestFetcherInner {
    http: Client,
    config: FetchConfig,
}

/// Fetches remote resources with a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    inner: Arc<ReqwestFetcherInner>,
}

impl std::fmt::Debug for ReqwestFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestFetcher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let timeout = config.effective_timeout();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            "Creating reqwest fetcher"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            inner: Arc::new(ReqwestFetcherInner { http, config }),
        })
    }

    /// Gets the fetcher configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.inner.config
    }
}

#[async_trait::async_trait]
impl UriFetcher for ReqwestFetcher {
    async fn fetch(&self, uri: &str) -> Result<String> {
        let url = parse_uri(uri)?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %url,
            "Fetching remote resource"
        );

        let response = self.inner.http.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(
                target: TRACING_TARGET,
                uri,
                status = status.as_u16(),
                "Remote resource returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            uri,
            size = body.len(),
            "Remote resource fetched"
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = ReqwestFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.config().http_timeout, 30);
    }

    #[tokio::test]
    async fn test_invalid_uri_is_rejected_before_sending() {
        let fetcher = ReqwestFetcher::new(FetchConfig::default()).unwrap();
        assert!(matches!(
            fetcher.fetch("mailto:someone@example.com").await,
            Err(FetchError::InvalidUri { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let fetcher = ReqwestFetcher::new(FetchConfig::default().with_timeout(2)).unwrap();
        assert!(matches!(
            fetcher.fetch("http://127.0.0.1:1/").await,
            Err(FetchError::Transport(_))
        ));
    }
}
