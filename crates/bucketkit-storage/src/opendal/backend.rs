//! OpenDAL operator wrapped as an [`ObjectBackend`].

use bytes::Bytes;
use futures::TryStreamExt;
use opendal::{ErrorKind, Operator, services};

use super::{BackendType, OpendalConfig};
use crate::{
    Acl, ListPage, ListRequest, ObjectBackend, ObjectEntry, StorageError, StorageResult,
    TRACING_TARGET,
};

/// Storage backend wrapping an OpenDAL operator.
#[derive(Clone)]
pub struct OpendalBackend {
    operator: Operator,
    config: OpendalConfig,
}

impl OpendalBackend {
    /// Creates a new backend from configuration.
    pub fn new(config: OpendalConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend_type,
            bucket = %config.bucket,
            "OpenDAL backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &OpendalConfig {
        &self.config
    }

    /// Returns the underlying operator.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn check_bucket(&self, bucket: &str) -> StorageResult<()> {
        if bucket == self.config.bucket {
            return Ok(());
        }

        Err(StorageError::bucket(format!(
            "backend serves bucket '{}', not '{bucket}'",
            self.config.bucket
        )))
    }

    /// Lists every file under the directory containing `prefix`.
    async fn scan(&self, prefix: &str) -> StorageResult<Vec<ObjectEntry>> {
        let dir = match prefix.rfind('/') {
            Some(index) => &prefix[..=index],
            None => "/",
        };

        let mut lister = match self.operator.lister_with(dir).recursive(true).await {
            Ok(lister) => lister,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::list(err.to_string())),
        };

        let mut entries = Vec::new();
        while let Some(entry) = lister.try_next().await? {
            if entry.metadata().is_dir() || !entry.path().starts_with(prefix) {
                continue;
            }

            // Some services only report sizes on stat.
            let size = match entry.metadata().content_length() {
                0 => self.operator.stat(entry.path()).await?.content_length(),
                size => size,
            };
            entries.push(ObjectEntry::new(entry.path(), size));
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn create_operator(config: &OpendalConfig) -> StorageResult<Operator> {
        match config.backend_type {
            BackendType::Memory => {
                let mut builder = services::Memory::default();

                if let Some(ref root) = config.root {
                    builder = builder.root(root);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            BackendType::Fs => {
                let root = config
                    .root
                    .as_deref()
                    .ok_or_else(|| StorageError::init("fs backend requires a root directory"))?;
                let builder = services::Fs::default().root(root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "opendal-s3")]
            BackendType::S3 => {
                let mut builder = services::S3::default().bucket(&config.bucket);

                if let Some(ref root) = config.root {
                    builder = builder.root(root);
                }

                if let Some(ref region) = config.region {
                    builder = builder.region(region);
                }

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectBackend for OpendalBackend {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: Acl,
        content_type: &str,
    ) -> StorageResult<()> {
        self.check_bucket(bucket)?;

        if acl == Acl::PublicRead {
            tracing::warn!(
                target: TRACING_TARGET,
                key,
                "Canned ACLs are not supported by OpenDAL, storing with default policy"
            );
        }

        tracing::debug!(
            target: TRACING_TARGET,
            key,
            size = body.len(),
            "Writing object"
        );

        let capability = self.operator.info().full_capability();
        if capability.write_with_content_type {
            self.operator
                .write_with(key, body)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, body).await?;
        }

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.check_bucket(bucket)?;

        tracing::debug!(
            target: TRACING_TARGET,
            key,
            "Reading object"
        );

        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        request: &ListRequest,
    ) -> StorageResult<ListPage> {
        self.check_bucket(bucket)?;

        let max_keys = request.max_keys.max(1);
        let after = request.continuation_token.as_deref();
        let mut matching = self
            .scan(&request.prefix)
            .await?
            .into_iter()
            .filter(|entry| request.matches(&entry.key))
            .filter(|entry| after.is_none_or(|after| entry.key.as_str() > after));

        let mut page = ListPage {
            entries: matching.by_ref().take(max_keys).collect(),
            next_continuation_token: None,
        };
        if matching.next().is_some() {
            page.next_continuation_token = page.entries.last().map(|e| e.key.clone());
        }

        Ok(page)
    }

    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        Ok(vec![self.config.bucket.clone()])
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        if bucket == self.config.bucket {
            return Ok(());
        }

        Err(StorageError::unsupported(format!(
            "cannot create bucket '{bucket}' through OpenDAL"
        )))
    }
}

impl std::fmt::Debug for OpendalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpendalBackend")
            .field("backend_type", &self.config.backend_type)
            .field("bucket", &self.config.bucket)
            .finish()
    }
}
