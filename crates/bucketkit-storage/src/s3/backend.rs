//! AWS SDK S3 client wrapped as an [`ObjectBackend`].

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl};
use bytes::Bytes;

use super::S3Config;
use crate::{
    Acl, ListPage, ListRequest, ObjectBackend, ObjectEntry, StorageError, StorageResult,
    TRACING_TARGET,
};

/// Region in which S3 rejects an explicit location constraint.
const IMPLICIT_REGION: &str = "us-east-1";

/// Storage backend talking to S3 through the AWS SDK.
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
    config: S3Config,
}

impl S3Backend {
    /// Creates a backend, resolving credentials from `config` or the
    /// default AWS provider chain.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "bucketkit",
            ));
        }

        if let Some(ref endpoint) = config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            target: TRACING_TARGET,
            region = %config.region,
            endpoint = ?config.endpoint,
            "S3 backend initialized"
        );

        Ok(Self::from_client(Client::from_conf(s3_config), config))
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Client, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Returns the underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn canned_acl(acl: Acl) -> ObjectCannedAcl {
    match acl {
        Acl::PublicRead => ObjectCannedAcl::PublicRead,
        Acl::Private => ObjectCannedAcl::Private,
    }
}

fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

#[async_trait::async_trait]
impl ObjectBackend for S3Backend {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: Acl,
        content_type: &str,
    ) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            bucket,
            key,
            size = body.len(),
            acl = %acl,
            "Putting object"
        );

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .acl(canned_acl(acl))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| StorageError::write(describe(&err)))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        tracing::debug!(
            target: TRACING_TARGET,
            bucket,
            key,
            "Getting object"
        );

        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let message = describe(&err);
                return Err(match err.into_service_error() {
                    service if service.is_no_such_key() => StorageError::not_found(key),
                    _ => StorageError::read(message),
                });
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::read(describe(&err)))?;

        Ok(body.into_bytes())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        request: &ListRequest,
    ) -> StorageResult<ListPage> {
        let max_keys = i32::try_from(request.max_keys.max(1)).unwrap_or(i32::MAX);

        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&request.prefix)
            .set_delimiter(request.delimiter.clone())
            .max_keys(max_keys)
            .set_continuation_token(request.continuation_token.clone())
            .send()
            .await
            .map_err(|err| StorageError::list(describe(&err)))?;

        let entries = output
            .contents()
            .iter()
            .filter_map(|object| {
                let size = u64::try_from(object.size().unwrap_or_default()).unwrap_or_default();
                object.key().map(|key| ObjectEntry::new(key, size))
            })
            .collect();

        let next_continuation_token = match output.is_truncated() {
            Some(true) => output.next_continuation_token().map(str::to_owned),
            _ => None,
        };

        Ok(ListPage {
            entries,
            next_continuation_token,
        })
    }

    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| StorageError::bucket(describe(&err)))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_owned))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        tracing::info!(
            target: TRACING_TARGET,
            bucket,
            region,
            "Creating bucket"
        );

        let mut request = self.client.create_bucket().bucket(bucket);
        if region != IMPLICIT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|err| StorageError::bucket(describe(&err)))?;

        Ok(())
    }
}
