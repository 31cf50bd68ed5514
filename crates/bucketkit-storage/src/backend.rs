//! Object backend trait and its request/response types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::StorageResult;

/// Largest page a single listing call returns by default.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Canned access policy applied to written objects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Acl {
    /// Readable by anyone holding the object URI.
    PublicRead,
    /// Readable by the bucket owner only.
    #[default]
    Private,
}

impl Acl {
    /// Maps a `public` flag to its canned policy.
    pub fn from_public(public: bool) -> Self {
        if public { Self::PublicRead } else { Self::Private }
    }
}

/// A single listed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

impl ObjectEntry {
    /// Creates a new entry.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }

    /// Returns `true` for zero-sized entries, which listings treat as
    /// directory placeholders.
    pub fn is_placeholder(&self) -> bool {
        self.size == 0
    }
}

/// Parameters of one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// Keys containing the delimiter after the prefix are rolled up and
    /// not returned as objects.
    pub delimiter: Option<String>,
    /// Maximum entries per page.
    pub max_keys: usize,
    /// Opaque token returned by the previous page.
    pub continuation_token: Option<String>,
}

impl ListRequest {
    /// Creates a request for every key under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            max_keys: DEFAULT_PAGE_SIZE,
            continuation_token: None,
        }
    }

    /// Sets the roll-up delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Resumes after a previous page.
    #[must_use]
    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    /// Returns `true` when `key` belongs on a page for this request, before
    /// continuation and page size are applied.
    pub fn matches(&self, key: &str) -> bool {
        let Some(rest) = key.strip_prefix(self.prefix.as_str()) else {
            return false;
        };

        match self.delimiter.as_deref() {
            Some(delimiter) if !delimiter.is_empty() => !rest.contains(delimiter),
            _ => true,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Entries in ascending key order.
    pub entries: Vec<ObjectEntry>,
    /// Token to request the next page, absent on the last page.
    pub next_continuation_token: Option<String>,
}

impl ListPage {
    /// Returns `true` when more pages follow.
    pub fn is_truncated(&self) -> bool {
        self.next_continuation_token.is_some()
    }
}

/// Storage operations the object store is built on.
///
/// Implementations must be safe to share between tasks. Keys handed to a
/// backend are already normalized.
#[async_trait::async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Writes `body` at `key`, replacing any existing object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: Acl,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Reads the object at `key`.
    ///
    /// Fails with [`StorageError::NotFound`](crate::StorageError::NotFound)
    /// when the object does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Returns one page of keys matching `request`.
    async fn list_objects_page(&self, bucket: &str, request: &ListRequest)
    -> StorageResult<ListPage>;

    /// Returns the names of all buckets visible to the credentials.
    async fn list_buckets(&self) -> StorageResult<Vec<String>>;

    /// Creates a bucket in `region`.
    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_strings() {
        assert_eq!(Acl::PublicRead.as_ref(), "public-read");
        assert_eq!(Acl::Private.to_string(), "private");
        assert_eq!(Acl::from_public(true), Acl::PublicRead);
        assert_eq!(Acl::from_public(false), Acl::Private);
    }

    #[test]
    fn test_request_matches_prefix() {
        let request = ListRequest::new("default/svc/");
        assert!(request.matches("default/svc/a.txt"));
        assert!(request.matches("default/svc/d/b.txt"));
        assert!(!request.matches("default/other/a.txt"));
    }

    #[test]
    fn test_request_rolls_up_delimited_keys() {
        let request = ListRequest::new("default/svc/").with_delimiter("/");
        assert!(request.matches("default/svc/a.txt"));
        assert!(!request.matches("default/svc/d/b.txt"));
    }

    #[test]
    fn test_delimiter_equal_to_prefix() {
        let prefix = "default/svc/d";
        let request = ListRequest::new(prefix).with_delimiter(prefix);
        assert!(request.matches("default/svc/d/x"));
        assert!(request.matches("default/svc/d2"));
    }

    #[test]
    fn test_placeholder_entries() {
        assert!(ObjectEntry::new("default/svc/d/", 0).is_placeholder());
        assert!(!ObjectEntry::new("default/svc/d/a", 3).is_placeholder());
    }
}
