//! Mock implementation of BlobStore trait for testing

use crate::error::{CatalogError, CatalogResult};
use crate::storage::{object_url, validate_key, BlobStore};
use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory bucket: key -> data
pub struct MockBlobStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    bucket: String,
    public_domain: String,
    fail_uploads: AtomicBool,
}

impl MockBlobStore {
    pub fn new(bucket: &str, public_domain: &str) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            bucket: bucket.to_string(),
            public_domain: public_domain.to_string(),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// Make every following upload fail with a blob store error
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    fn objects(&self) -> CatalogResult<MutexGuard<'_, HashMap<String, Bytes>>> {
        self.objects
            .lock()
            .map_err(|_| CatalogError::Blob("mock bucket lock poisoned".to_string()))
    }

    /// Stored bytes for `key`
    pub fn get(&self, key: &str) -> CatalogResult<Option<Bytes>> {
        Ok(self.objects()?.get(key).cloned())
    }

    /// Number of stored objects
    pub fn object_count(&self) -> CatalogResult<usize> {
        Ok(self.objects()?.len())
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new("mock-bucket", "s3.amazonaws.com")
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn upload(&self, key: &str, data: Bytes) -> CatalogResult<String> {
        validate_key(key)?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(CatalogError::Blob(format!("mock upload of {} rejected", key)));
        }

        info!("Mock: stored {} ({} bytes)", key, data.len());
        self.objects()?.insert(key.to_string(), data);
        Ok(object_url(&self.bucket, &self.public_domain, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_blob_store_basic_operations() {
        let store = MockBlobStore::new("movies", "s3.amazonaws.com");
        assert_eq!(store.object_count().unwrap(), 0);

        let url = store.upload("a.mp4", Bytes::from_static(b"one")).await.unwrap();
        assert_eq!(url, "https://movies.s3.amazonaws.com/a.mp4");
        assert_eq!(store.get("a.mp4").unwrap(), Some(Bytes::from_static(b"one")));

        // Same key silently overwrites
        store.upload("a.mp4", Bytes::from_static(b"two")).await.unwrap();
        assert_eq!(store.object_count().unwrap(), 1);
        assert_eq!(store.get("a.mp4").unwrap(), Some(Bytes::from_static(b"two")));
    }

    #[tokio::test]
    async fn test_mock_blob_store_failure_switch() {
        let store = MockBlobStore::default();
        store.set_fail_uploads(true);
        let result = store.upload("a.mp4", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(CatalogError::Blob(_))));
        assert_eq!(store.object_count().unwrap(), 0);

        store.set_fail_uploads(false);
        assert!(store.upload("a.mp4", Bytes::from_static(b"x")).await.is_ok());
    }
}
