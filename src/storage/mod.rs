//! Blob Storage Layer Abstraction
//!
//! This module provides an abstraction over the object store that holds movie
//! files, allowing the system to use different storage implementations (S3,
//! local directory, in-memory) without affecting higher-level services.

pub mod config;
pub mod local_store;
pub mod mock_store;
pub mod s3_store;


use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{CatalogError, CatalogResult};

/// Trait defining the blob storage interface
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under exactly `key`, overwriting any existing object,
    /// and return the URL the object is published under.
    async fn upload(&self, key: &str, data: Bytes) -> CatalogResult<String>;
}

/// Reject keys no backend can store. Object stores take any other key
/// verbatim; path rules belong to the local backend.
pub fn validate_key(key: &str) -> CatalogResult<()> {
    if key.trim().is_empty() {
        return Err(CatalogError::Validation("file name must not be empty".to_string()));
    }
    Ok(())
}

/// URL naming convention for a bucket-hosted object; not verified to resolve
pub fn object_url(bucket: &str, domain: &str, key: &str) -> String {
    format!("https://{}.{}/{}", bucket, domain, key)
}
