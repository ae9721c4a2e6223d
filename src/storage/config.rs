//! Configuration for blob storage backends

use crate::error::CatalogResult;
use crate::storage::{
    local_store::LocalBlobStore, mock_store::MockBlobStore, s3_store::S3BlobStore, BlobStore,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::sync::Arc;

/// Available blob storage backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
    Mock,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" | "disk" => Ok(StorageBackend::Local),
            "mock" => Ok(StorageBackend::Mock),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Blob storage configuration.
///
/// Static credentials are optional; without them the AWS default provider
/// chain (environment, profile, instance role) is used.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: StorageBackend,
    /// Bucket receiving uploads
    pub bucket: String,
    /// AWS region of the bucket
    pub region: String,
    /// Domain used when building public object URLs
    pub public_domain: String,
    /// Endpoint override for S3-compatible services
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing)]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Directory used by the local backend
    pub base_path: String,
    /// URL prefix reported by the local backend
    pub public_base_url: String,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("public_domain", &self.public_domain)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "<redacted>"))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<redacted>"))
            .field("base_path", &self.base_path)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: "movie-streaming-app-bucket".to_string(),
            region: "us-east-1".to_string(),
            public_domain: "s3.amazonaws.com".to_string(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            base_path: "./data/blobs".to_string(),
            public_base_url: "file://./data/blobs".to_string(),
        }
    }
}

impl StorageConfig {
    /// Overlay settings from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(backend_str) = env::var("STORAGE_BACKEND") {
            match backend_str.parse::<StorageBackend>() {
                Ok(backend) => {
                    info!("Using storage backend from environment: {:?}", backend);
                    self.backend = backend;
                }
                Err(e) => warn!("Invalid storage backend in environment: {}. Keeping {:?}.", e, self.backend),
            }
        }
        if let Ok(bucket) = env::var("BLOB_BUCKET") {
            self.bucket = bucket;
        }
        if let Ok(region) = env::var("AWS_REGION") {
            self.region = region;
        }
        if let Ok(endpoint) = env::var("BLOB_ENDPOINT") {
            self.endpoint_url = Some(endpoint);
        }
        if let Ok(key_id) = env::var("BLOB_ACCESS_KEY_ID") {
            self.access_key_id = Some(key_id);
        }
        if let Ok(secret) = env::var("BLOB_SECRET_ACCESS_KEY") {
            self.secret_access_key = Some(secret);
        }
        if let Ok(dir) = env::var("STORAGE_DIRECTORY") {
            self.base_path = dir;
        }
    }

    /// Static credentials, only when both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one half of the blob store credentials is set; using the default provider chain");
                None
            }
            _ => None,
        }
    }

    /// Create a storage instance based on the configuration
    pub async fn create_store(&self) -> CatalogResult<Arc<dyn BlobStore>> {
        let store: Arc<dyn BlobStore> = match self.backend {
            StorageBackend::S3 => {
                info!("Creating S3 blob store for bucket {}", self.bucket);
                Arc::new(S3BlobStore::new(self).await)
            }
            StorageBackend::Local => {
                info!("Creating local blob store at {}", self.base_path);
                Arc::new(LocalBlobStore::new(&self.base_path, &self.public_base_url)?)
            }
            StorageBackend::Mock => {
                info!("Creating Mock blob store");
                Arc::new(MockBlobStore::new(&self.bucket, &self.public_domain))
            }
        };
        Ok(store)
    }
}
