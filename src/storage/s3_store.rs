//! S3 blob storage backend

use crate::error::{CatalogError, CatalogResult};
use crate::storage::config::StorageConfig;
use crate::storage::{object_url, validate_key, BlobStore};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use log::{debug, error, info};

/// Uploads movie files to a single bucket with a private ACL
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_domain: String,
}

impl S3BlobStore {
    pub async fn new(config: &StorageConfig) -> Self {
        info!(
            "Initializing S3 blob storage (bucket: {}, region: {})",
            config.bucket, config.region
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some((key_id, secret)) = config.static_credentials() {
            debug!("Using configured static credentials for S3");
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "movie-catalog-config",
            ));
        }
        let sdk_config = loader.load().await;

        let mut s3_config_builder = S3ConfigBuilder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            debug!("Using custom S3 endpoint: {}", endpoint);
            s3_config_builder = s3_config_builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::from_client(Client::from_conf(s3_config_builder.build()), config)
    }

    pub fn from_client(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            public_domain: config.public_domain.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, key: &str, data: Bytes) -> CatalogResult<String> {
        validate_key(key)?;
        let size = data.len();
        debug!("Uploading {} to bucket {} ({} bytes)", key, self.bucket, size);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::Private)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload {} to S3: {}", key, DisplayErrorContext(&e));
                CatalogError::Blob(format!("S3 upload of {} failed: {}", key, DisplayErrorContext(&e)))
            })?;

        info!("Uploaded {} to bucket {} ({} bytes)", key, self.bucket, size);
        Ok(object_url(&self.bucket, &self.public_domain, key))
    }
}
