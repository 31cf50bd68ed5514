//! AWS S3 client configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration of the AWS SDK S3 client.
///
/// Credentials fall back to the standard AWS provider chain when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct S3Config {
    /// AWS region used for requests and new buckets
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-region", env = "S3_REGION", default_value = DEFAULT_REGION)
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (for S3-compatible storage like MinIO, R2)
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "S3_ENDPOINT"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access key ID
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-access-key-id", env = "S3_ACCESS_KEY_ID")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// Secret access key
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-secret-access-key", env = "S3_SECRET_ACCESS_KEY")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,

    /// Address buckets by path instead of virtual host
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-force-path-style", env = "S3_FORCE_PATH_STYLE")
    )]
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

impl Default for S3Config {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl S3Config {
    /// Creates a configuration for `region`.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        }
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Enables path-style addressing.
    #[must_use]
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}
