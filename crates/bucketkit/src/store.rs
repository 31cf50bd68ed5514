//! The object store façade.

use std::collections::HashSet;
use std::sync::Arc;

use bucketkit_core::cache::CacheEnvelope;
use bucketkit_core::codec::{self, RANDOM_SUFFIX_LENGTH};
use bucketkit_core::path::{PathBuilder, StorageKey};
use bucketkit_core::{Record, Value};
use bucketkit_fetch::UriFetcher;
use bucketkit_storage::{ListRequest, ObjectBackend, ObjectLister};
use bytes::Bytes;
use jiff::Timestamp;

use crate::{
    DirectoryName, ListedObject, Result, SaveOptions, StoreConfig, TRACING_TARGET, UriSaveOptions,
};

/// File-like access to one service namespace of a bucket.
///
/// Objects are addressed by logical paths which are namespaced under
/// `default/{service}/` (or `cache/{service}/` for cache entries). Clones
/// share the same backend and fetcher.
#[derive(Clone)]
pub struct ObjectStore {
    config: StoreConfig,
    paths: PathBuilder,
    backend: Arc<dyn ObjectBackend>,
    fetcher: Arc<dyn UriFetcher>,
}

impl ObjectStore {
    /// Creates a store over `backend`, fetching remote resources with
    /// `fetcher`.
    pub fn new(
        config: StoreConfig,
        backend: Arc<dyn ObjectBackend>,
        fetcher: Arc<dyn UriFetcher>,
    ) -> Self {
        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %config.bucket,
            region = %config.region,
            service = %config.service,
            "Object store created"
        );

        Self {
            paths: PathBuilder::new(config.service.clone()),
            config,
            backend,
            fetcher,
        }
    }

    /// Connects to S3 through the AWS SDK and fetches remote resources with
    /// reqwest.
    #[cfg(all(feature = "s3", feature = "reqwest"))]
    #[cfg_attr(docsrs, doc(cfg(all(feature = "s3", feature = "reqwest"))))]
    pub async fn connect_s3(
        config: StoreConfig,
        s3: bucketkit_storage::s3::S3Config,
        fetch: bucketkit_fetch::reqwest::FetchConfig,
    ) -> Result<Self> {
        let backend = bucketkit_storage::s3::S3Backend::new(s3).await?;
        let fetcher = bucketkit_fetch::reqwest::ReqwestFetcher::new(fetch)?;
        Ok(Self::new(config, Arc::new(backend), Arc::new(fetcher)))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the key builder for this store's service.
    pub fn paths(&self) -> &PathBuilder {
        &self.paths
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> &Arc<dyn ObjectBackend> {
        &self.backend
    }

    /// Formats the public URI of `key`.
    pub fn object_uri(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.config.bucket, self.config.region
        )
    }

    /// Saves `value` at a logical path and returns its URI.
    #[tracing::instrument(skip(self, value), target = TRACING_TARGET)]
    pub async fn save(
        &self,
        path: &str,
        value: impl Into<Value>,
        options: &SaveOptions,
    ) -> Result<String> {
        let key = self.paths.file_key(path, options.use_date_prefix)?;
        self.put(key, &value.into(), options).await
    }

    /// Saves `value` at a full storage key and returns its URI.
    ///
    /// The key is normalized but not namespaced; the date prefix option is
    /// ignored.
    #[tracing::instrument(skip(self, value), target = TRACING_TARGET)]
    pub async fn save_at_key(
        &self,
        full_key: &str,
        value: impl Into<Value>,
        options: &SaveOptions,
    ) -> Result<String> {
        let key = StorageKey::parse(full_key)?;
        self.put(key, &value.into(), options).await
    }

    /// Stores `value` as a cache entry living `ttl_seconds` (`-1` never
    /// expires) and returns its URI.
    ///
    /// Cache entries are always private and written as plain JSON.
    #[tracing::instrument(skip(self, value), target = TRACING_TARGET)]
    pub async fn save_cache(
        &self,
        path: &str,
        value: impl Into<Value>,
        ttl_seconds: f64,
    ) -> Result<String> {
        let key = self.paths.cache_key(path)?;
        let envelope = CacheEnvelope::wrap(&value.into(), ttl_seconds);
        let options = SaveOptions::default();
        let body = codec::encode(&envelope.to_value(), options.compression)?;
        self.put_encoded(key, body, &options).await
    }

    /// Fetches `uri` and saves its body as text at a logical path.
    ///
    /// When the fetch fails and [`UriSaveOptions::save_always`] is set, the
    /// error message is saved in place of the body.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn save_uri(
        &self,
        path: &str,
        uri: &str,
        options: &UriSaveOptions,
    ) -> Result<String> {
        let body = match self.fetcher.fetch(uri).await {
            Ok(body) => body,
            Err(err) if options.save_always => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    uri,
                    error = %err,
                    "Remote fetch failed, saving the error message"
                );
                err.to_string()
            }
            Err(err) => return Err(err.into()),
        };

        self.save(path, Value::Text(body), &options.save).await
    }

    /// Loads and decodes the object at a logical path.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn load(&self, path: &str) -> Result<Value> {
        let key = self.paths.file_key(path, false)?;
        self.load_key(&key).await
    }

    /// Loads and decodes the object at a full storage key.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn load_at_key(&self, full_key: &str) -> Result<Value> {
        let key = StorageKey::parse(full_key)?;
        self.load_key(&key).await
    }

    /// Loads a parquet object at a logical path as records.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn load_records(&self, path: &str) -> Result<Vec<Record>> {
        let key = self.paths.file_key(path, false)?;
        let body = self.get(&key).await?;
        Ok(codec::decode_tabular(body)?)
    }

    /// Returns the cached value, or `None` when the entry is missing,
    /// unreadable, not a cache entry, or expired.
    ///
    /// Expired entries are left in place.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn load_cache(&self, name: &str) -> Result<Option<Value>> {
        let key = self.paths.cache_key(name)?;

        let value = match self.load_key(&key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    key = %key,
                    error = %err,
                    "Cache miss"
                );
                return Ok(None);
            }
        };

        let Some(envelope) = CacheEnvelope::from_value(value) else {
            tracing::debug!(
                target: TRACING_TARGET,
                key = %key,
                "Cache miss: object is not a cache entry"
            );
            return Ok(None);
        };

        Ok(envelope.unwrap_if_fresh(Timestamp::now()))
    }

    /// Returns a lazy cursor over every entry under the directory of a
    /// logical path, zero-sized placeholders included.
    pub fn objects(&self, path: &str) -> Result<ObjectLister> {
        let dir_key = self.paths.dir_key(path)?;
        Ok(self.lister(&dir_key))
    }

    /// Lists the objects under the directory of a logical path, skipping
    /// zero-sized placeholders. With `load`, each object's decoded content
    /// is attached.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn list_objects(&self, path: &str, load: bool) -> Result<Vec<ListedObject>> {
        let dir_key = self.paths.dir_key(path)?;
        let entries = self.lister(&dir_key).collect_all().await?;

        let mut listed = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(|entry| !entry.is_placeholder()) {
            let mut object = ListedObject::from(entry);
            if load {
                let key = StorageKey::from_normalized(object.key.as_str());
                object.data = Some(self.load_key(&key).await?);
            }
            listed.push(object);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            prefix = %dir_key,
            count = listed.len(),
            "Listed objects"
        );

        Ok(listed)
    }

    /// Returns the distinct parent directories of the objects under a
    /// logical path, in the order they are first listed.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn list_directory_names(&self, path: &str) -> Result<Vec<DirectoryName>> {
        let dir_key = self.paths.dir_key(path)?;

        let mut seen = HashSet::new();
        let names = self
            .list_objects(path, false)
            .await?
            .into_iter()
            .map(|object| DirectoryName::of(&object.key, dir_key.as_str()))
            .filter(|name| seen.insert(name.key.clone()))
            .collect();

        Ok(names)
    }

    /// Creates bucket `name` in the configured region unless it already
    /// exists. Returns `true` when the bucket was created.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn make_bucket(&self, name: &str) -> Result<bool> {
        let buckets = self.backend.list_buckets().await?;
        if buckets.iter().any(|bucket| bucket == name) {
            tracing::debug!(
                target: TRACING_TARGET,
                bucket = name,
                "Bucket already exists"
            );
            return Ok(false);
        }

        self.backend.create_bucket(name, &self.config.region).await?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = name,
            region = %self.config.region,
            "Bucket created"
        );

        Ok(true)
    }

    fn lister(&self, dir_key: &StorageKey) -> ObjectLister {
        let request = ListRequest::new(dir_key.as_str()).with_delimiter(dir_key.as_str());
        ObjectLister::new(self.backend.clone(), self.config.bucket.clone(), request)
    }

    async fn put(&self, key: StorageKey, value: &Value, options: &SaveOptions) -> Result<String> {
        let key = if options.random {
            key.with_file_stem(&codec::random_suffix(RANDOM_SUFFIX_LENGTH))
        } else {
            key
        };

        let body = codec::encode_for_key(value, &key, options.compression)?;
        self.put_encoded(key, body, options).await
    }

    async fn put_encoded(
        &self,
        key: StorageKey,
        body: Bytes,
        options: &SaveOptions,
    ) -> Result<String> {
        let acl = options.acl();
        let content_type = codec::content_type_for(&key);

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = body.len(),
            acl = %acl,
            content_type = %content_type,
            "Putting object"
        );

        self.backend
            .put_object(&self.config.bucket, key.as_str(), body, acl, &content_type)
            .await?;

        Ok(self.object_uri(key.as_str()))
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes> {
        let body = self
            .backend
            .get_object(&self.config.bucket, key.as_str())
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = body.len(),
            "Got object"
        );

        Ok(body)
    }

    async fn load_key(&self, key: &StorageKey) -> Result<Value> {
        let body = self.get(key).await?;
        Ok(codec::decode(body, key)?)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
