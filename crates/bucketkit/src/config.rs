//! Object store configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Bucket, region and service an [`ObjectStore`](crate::ObjectStore) is
/// bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StoreConfig {
    /// Bucket holding every object
    #[cfg_attr(feature = "config", arg(long = "bucket", env = "BUCKETKIT_BUCKET"))]
    pub bucket: String,

    /// Region of the bucket, used in object URIs and bucket creation
    #[cfg_attr(
        feature = "config",
        arg(long = "region", env = "BUCKETKIT_REGION", default_value = DEFAULT_REGION)
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// Service name, the second level of every key
    #[cfg_attr(feature = "config", arg(long = "service", env = "BUCKETKIT_SERVICE"))]
    pub service: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_owned()
}

impl StoreConfig {
    /// Creates a configuration in the default region.
    pub fn new(bucket: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            service: service.into(),
        }
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}
