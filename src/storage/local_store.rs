//! Local directory blob storage implementation

use crate::error::{CatalogError, CatalogResult};
use crate::storage::{validate_key, BlobStore};
use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use std::path::{Path, PathBuf};

/// Keys become paths, so they must stay inside the storage directory
fn validate_local_key(key: &str) -> CatalogResult<()> {
    validate_key(key)?;
    if key.starts_with('/') || key.starts_with('\\') {
        return Err(CatalogError::Validation(format!("file name must be relative: {}", key)));
    }
    if key.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(CatalogError::Validation(format!("file name must not contain '..': {}", key)));
    }
    Ok(())
}

/// Stores each uploaded file as `<base_path>/<key>`
pub struct LocalBlobStore {
    storage_path: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new<P: AsRef<Path>>(base_path: P, public_base_url: &str) -> CatalogResult<Self> {
        let storage_path = base_path.as_ref().to_path_buf();
        if !storage_path.exists() {
            std::fs::create_dir_all(&storage_path).map_err(|e| {
                CatalogError::Blob(format!(
                    "failed to create storage directory {}: {}",
                    storage_path.display(),
                    e
                ))
            })?;
        }
        info!("Using local storage directory: {}", storage_path.display());

        Ok(Self {
            storage_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.storage_path.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, key: &str, data: Bytes) -> CatalogResult<String> {
        validate_local_key(key)?;
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::Blob(format!("failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| CatalogError::Blob(format!("failed to write {}: {}", path.display(), e)))?;

        info!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}
