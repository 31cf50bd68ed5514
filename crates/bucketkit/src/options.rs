//! Per-call save options.

use bucketkit_core::codec::Compression;
use bucketkit_storage::Acl;
use serde::{Deserialize, Serialize};

/// Options shared by every save operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Store with a `public-read` ACL instead of `private`.
    pub public: bool,
    /// Insert today's date (`YYYY-MM-DD/`) before the logical path.
    pub use_date_prefix: bool,
    /// Replace the file name with a random one, keeping the extension.
    pub random: bool,
    /// Compression applied after encoding.
    pub compression: Compression,
}

impl SaveOptions {
    /// Sets the public flag.
    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Sets the date prefix flag.
    #[must_use]
    pub fn with_date_prefix(mut self, use_date_prefix: bool) -> Self {
        self.use_date_prefix = use_date_prefix;
        self
    }

    /// Sets the random file name flag.
    #[must_use]
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Sets the compression.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the ACL matching the public flag.
    pub fn acl(&self) -> Acl {
        Acl::from_public(self.public)
    }
}

/// Options for [`ObjectStore::save_uri`](crate::ObjectStore::save_uri).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UriSaveOptions {
    /// Options applied to the stored object.
    #[serde(flatten)]
    pub save: SaveOptions,
    /// Store the failure message when the fetch fails instead of
    /// returning the error.
    pub save_always: bool,
}

impl Default for UriSaveOptions {
    fn default() -> Self {
        Self {
            save: SaveOptions::default(),
            save_always: true,
        }
    }
}

impl UriSaveOptions {
    /// Sets the options applied to the stored object.
    #[must_use]
    pub fn with_save_options(mut self, save: SaveOptions) -> Self {
        self.save = save;
        self
    }

    /// Sets the save-always flag.
    #[must_use]
    pub fn with_save_always(mut self, save_always: bool) -> Self {
        self.save_always = save_always;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SaveOptions::default();
        assert!(!options.public && !options.use_date_prefix && !options.random);
        assert_eq!(options.compression, Compression::None);
        assert_eq!(options.acl(), Acl::Private);
        assert!(UriSaveOptions::default().save_always);
    }

    #[test]
    fn test_partial_deserialize() {
        let options: UriSaveOptions =
            serde_json::from_str(r#"{"public": true, "compression": "gzip"}"#).unwrap();
        assert!(options.save.public);
        assert_eq!(options.save.compression, Compression::Gzip);
        assert!(options.save_always);
    }
}
