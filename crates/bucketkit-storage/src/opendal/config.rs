//! OpenDAL backend configuration.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// OpenDAL service used by [`OpendalBackend`](super::OpendalBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// Process-local memory.
    Memory,
    /// Local filesystem rooted at [`OpendalConfig::root`].
    Fs,
    /// Amazon S3 compatible storage.
    #[cfg(feature = "opendal-s3")]
    S3,
}

/// Configuration of an OpenDAL-backed store.
///
/// An operator is bound to a single bucket, so [`OpendalConfig::bucket`]
/// names the only bucket the backend serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpendalConfig {
    /// Service to connect to.
    pub backend_type: BackendType,
    /// Bucket served by this backend.
    pub bucket: String,
    /// Root directory (filesystem) or path prefix (object stores).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Region of the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint URL (for S3-compatible storage like MinIO, R2).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Access key ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl OpendalConfig {
    fn new(backend_type: BackendType, bucket: impl Into<String>) -> Self {
        Self {
            backend_type,
            bucket: bucket.into(),
            root: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Creates an in-memory configuration.
    pub fn memory(bucket: impl Into<String>) -> Self {
        Self::new(BackendType::Memory, bucket)
    }

    /// Creates a filesystem configuration storing objects under `root`.
    pub fn fs(bucket: impl Into<String>, root: impl Into<String>) -> Self {
        Self::new(BackendType::Fs, bucket).with_root(root)
    }

    /// Creates an S3 configuration.
    #[cfg(feature = "opendal-s3")]
    pub fn s3(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        let mut config = Self::new(BackendType::S3, bucket);
        config.region = Some(region.into());
        config
    }

    /// Sets the root directory or path prefix.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_config() {
        let config = OpendalConfig::fs("bucket", "/tmp/objects");
        assert_eq!(config.backend_type, BackendType::Fs);
        assert_eq!(config.root.as_deref(), Some("/tmp/objects"));
    }

    #[test]
    fn test_serialized_shape() {
        let config = OpendalConfig::memory("bucket").with_credentials("id", "secret");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["backend_type"], "memory");
        assert_eq!(json["access_key_id"], "id");
        assert!(json.get("root").is_none());
    }
}
