//! In-process backend holding objects in memory.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{
    Acl, ListPage, ListRequest, ObjectBackend, ObjectEntry, StorageError, StorageResult,
    TRACING_TARGET,
};

/// An object as held by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object payload.
    pub body: Bytes,
    /// Access policy it was written with.
    pub acl: Acl,
    /// Content type it was written with.
    pub content_type: String,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    region: String,
    objects: BTreeMap<String, StoredObject>,
}

/// Backend keeping buckets and objects in process memory.
///
/// Clones share the same storage. Continuation tokens are the last key of
/// the previous page.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    buckets: Arc<RwLock<BTreeMap<String, MemoryBucket>>>,
    list_calls: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Creates a backend without any bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given buckets already present.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buckets = names
            .into_iter()
            .map(|name| (name.into(), MemoryBucket::default()))
            .collect();

        Self {
            buckets: Arc::new(RwLock::new(buckets)),
            list_calls: Arc::default(),
        }
    }

    /// Returns a stored object with its metadata.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket)?.objects.get(key).cloned()
    }

    /// Returns every key in `bucket` in ascending order.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .map(|bucket| bucket.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the region a bucket was created in.
    pub async fn bucket_region(&self, bucket: &str) -> Option<String> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket).map(|bucket| bucket.region.clone())
    }

    /// Returns how many listing pages have been served.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::bucket(format!("no such bucket: {bucket}"))
}

#[async_trait::async_trait]
impl ObjectBackend for MemoryBackend {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: Acl,
        content_type: &str,
    ) -> StorageResult<()> {
        let mut buckets = self.buckets.write().await;
        let objects = &mut buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .objects;

        tracing::trace!(
            target: TRACING_TARGET,
            bucket,
            key,
            size = body.len(),
            acl = %acl,
            "Storing object in memory"
        );

        objects.insert(
            key.to_owned(),
            StoredObject {
                body,
                acl,
                content_type: content_type.to_owned(),
            },
        );

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        request: &ListRequest,
    ) -> StorageResult<ListPage> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);

        let buckets = self.buckets.read().await;
        let objects = &buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?
            .objects;

        let range = match request.continuation_token.as_deref() {
            Some(token) => objects.range::<str, _>((Bound::Excluded(token), Bound::Unbounded)),
            None => objects.range::<str, _>(..),
        };

        let max_keys = request.max_keys.max(1);
        let mut page = ListPage::default();
        for (key, object) in range.filter(|(key, _)| request.matches(key)) {
            if page.entries.len() == max_keys {
                page.next_continuation_token = page.entries.last().map(|e| e.key.clone());
                break;
            }
            page.entries
                .push(ObjectEntry::new(key.clone(), object.body.len() as u64));
        }

        Ok(page)
    }

    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(StorageError::bucket(format!(
                "bucket already exists: {bucket}"
            )));
        }

        buckets.insert(
            bucket.to_owned(),
            MemoryBucket {
                region: region.to_owned(),
                objects: BTreeMap::new(),
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "bucket";

    async fn put(backend: &MemoryBackend, key: &str, body: &'static [u8]) {
        backend
            .put_object(BUCKET, key, Bytes::from_static(body), Acl::Private, "text/plain")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        backend
            .put_object(
                BUCKET,
                "default/svc/a.json",
                Bytes::from_static(b"{}"),
                Acl::PublicRead,
                "application/json",
            )
            .await
            .unwrap();

        let body = backend.get_object(BUCKET, "default/svc/a.json").await.unwrap();
        assert_eq!(body.as_ref(), b"{}");

        let object = backend.object(BUCKET, "default/svc/a.json").await.unwrap();
        assert_eq!(object.acl, Acl::PublicRead);
        assert_eq!(object.content_type, "application/json");
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        let error = backend.get_object(BUCKET, "missing").await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let backend = MemoryBackend::new();
        let error = backend
            .put_object("nope", "k", Bytes::new(), Acl::Private, "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(error, StorageError::Bucket(_)));
    }

    #[tokio::test]
    async fn test_list_pages_in_key_order() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        put(&backend, "default/svc/c", b"3").await;
        put(&backend, "default/svc/a", b"1").await;
        put(&backend, "default/svc/b", b"22").await;
        put(&backend, "default/other/x", b"x").await;

        let request = ListRequest::new("default/svc/").with_max_keys(2);
        let first = backend.list_objects_page(BUCKET, &request).await.unwrap();
        assert_eq!(
            first.entries,
            vec![
                ObjectEntry::new("default/svc/a", 1),
                ObjectEntry::new("default/svc/b", 2)
            ]
        );
        assert!(first.is_truncated());

        let request = request.with_continuation_token(first.next_continuation_token.unwrap());
        let second = backend.list_objects_page(BUCKET, &request).await.unwrap();
        assert_eq!(second.entries, vec![ObjectEntry::new("default/svc/c", 1)]);
        assert!(!second.is_truncated());
    }

    #[tokio::test]
    async fn test_full_page_without_more_keys_is_last() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        put(&backend, "default/svc/a", b"1").await;
        put(&backend, "default/svc/b", b"1").await;

        let request = ListRequest::new("default/svc/").with_max_keys(2);
        let page = backend.list_objects_page(BUCKET, &request).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert!(!page.is_truncated());
    }

    #[tokio::test]
    async fn test_list_with_delimiter() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        put(&backend, "default/svc/top", b"1").await;
        put(&backend, "default/svc/dir/nested", b"1").await;

        let request = ListRequest::new("default/svc/").with_delimiter("/");
        let page = backend.list_objects_page(BUCKET, &request).await.unwrap();
        assert_eq!(page.entries, vec![ObjectEntry::new("default/svc/top", 1)]);
    }

    #[tokio::test]
    async fn test_create_bucket() {
        let backend = MemoryBackend::new();
        backend.create_bucket("fresh", "eu-west-1").await.unwrap();

        assert_eq!(backend.list_buckets().await.unwrap(), vec!["fresh".to_owned()]);
        assert_eq!(backend.bucket_region("fresh").await.as_deref(), Some("eu-west-1"));
        assert!(backend.create_bucket("fresh", "eu-west-1").await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let backend = MemoryBackend::with_buckets([BUCKET]);
        let clone = backend.clone();
        put(&clone, "default/svc/a", b"1").await;
        assert_eq!(backend.keys(BUCKET).await, vec!["default/svc/a".to_owned()]);
    }
}
