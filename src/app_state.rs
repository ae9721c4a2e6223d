//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use std::sync::Arc;
use log::info;

use crate::config::AppConfig;
use crate::error::CatalogResult;
use crate::metadata::{mock_store::MockMovieStore, MovieStore};
use crate::service::movie_service::MovieService;
use crate::storage::{mock_store::MockBlobStore, BlobStore};

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub movie_service: Arc<MovieService>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with backends chosen by the configuration
    pub async fn from_config(config: AppConfig) -> CatalogResult<Self> {
        info!(
            "Initializing application state (metadata: {:?}, storage: {:?})",
            config.metadata.backend, config.storage.backend
        );

        let movies = config.metadata.create_store().await?;
        let blobs = config.storage.create_store().await?;

        info!("Application state initialized successfully");
        Ok(Self::with_stores(movies, blobs, config))
    }

    /// Create application state around existing stores
    pub fn with_stores(movies: Arc<dyn MovieStore>, blobs: Arc<dyn BlobStore>, config: AppConfig) -> Self {
        Self {
            movie_service: Arc::new(MovieService::new(movies, blobs)),
            config,
        }
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> Self {
        let config = AppConfig::default();
        let movies: Arc<dyn MovieStore> = Arc::new(MockMovieStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(MockBlobStore::new(
            &config.storage.bucket,
            &config.storage.public_domain,
        ));
        Self::with_stores(movies, blobs, config)
    }
}
