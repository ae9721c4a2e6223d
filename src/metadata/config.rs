//! Configuration for metadata storage backends

use crate::error::CatalogResult;
use crate::metadata::{
    dynamodb_store::DynamoMovieStore, mock_store::MockMovieStore, sqlite_store::SQLiteMovieStore,
    MovieStore,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Available metadata storage backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub enum MetadataBackend {
    #[default]
    DynamoDB,
    SQLite,
    Mock,
}

impl std::str::FromStr for MetadataBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(MetadataBackend::DynamoDB),
            "sqlite" => Ok(MetadataBackend::SQLite),
            "mock" => Ok(MetadataBackend::Mock),
            _ => Err(format!("Unknown metadata backend: {}", s)),
        }
    }
}

/// Metadata backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    /// Metadata backend type
    pub backend: MetadataBackend,
    /// DynamoDB table name
    pub table_name: String,
    /// Secondary index keyed by Rating
    pub rating_index: String,
    /// Secondary index keyed by Genre
    pub genre_index: String,
    /// AWS region of the table
    pub region: String,
    /// Endpoint override, e.g. a local DynamoDB
    pub endpoint_url: Option<String>,
    /// SQLite database file path
    pub db_path: String,
    /// Enable WAL mode for SQLite
    pub wal_mode: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            backend: MetadataBackend::default(),
            table_name: "Movies".to_string(),
            rating_index: "RatingIndex".to_string(),
            genre_index: "GenreIndex".to_string(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            db_path: "./data/movies.db".to_string(),
            wal_mode: true,
        }
    }
}

impl MetadataConfig {
    /// Overlay settings from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(backend_str) = env::var("METADATA_BACKEND") {
            match backend_str.parse::<MetadataBackend>() {
                Ok(backend) => {
                    info!("Using metadata backend from environment: {:?}", backend);
                    self.backend = backend;
                }
                Err(e) => warn!("Invalid metadata backend in environment: {}. Keeping {:?}.", e, self.backend),
            }
        }
        if let Ok(table) = env::var("MOVIES_TABLE") {
            self.table_name = table;
        }
        if let Ok(region) = env::var("AWS_REGION") {
            self.region = region;
        }
        if let Ok(endpoint) = env::var("DYNAMODB_ENDPOINT") {
            self.endpoint_url = Some(endpoint);
        }
        if let Ok(path) = env::var("SQLITE_DB_FILE") {
            self.db_path = path;
        }
    }

    /// Create a metadata storage instance based on the configuration
    pub async fn create_store(&self) -> CatalogResult<Arc<dyn MovieStore>> {
        let store: Arc<dyn MovieStore> = match self.backend {
            MetadataBackend::DynamoDB => {
                info!("Creating DynamoDB metadata store for table {}", self.table_name);
                Arc::new(DynamoMovieStore::new(self).await)
            }
            MetadataBackend::SQLite => {
                info!("Creating SQLite metadata store at {}, wal_mode: {}", self.db_path, self.wal_mode);
                let store = SQLiteMovieStore::open(&self.db_path)?;
                if self.wal_mode {
                    store.enable_wal()?;
                }
                Arc::new(store)
            }
            MetadataBackend::Mock => {
                info!("Creating Mock metadata store");
                Arc::new(MockMovieStore::new())
            }
        };
        Ok(store)
    }
}
