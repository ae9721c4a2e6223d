//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use log::{info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::config::MetadataConfig;
use crate::storage::config::StorageConfig;

/// Environment variable naming an alternative config file
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Metadata table configuration
    pub metadata: MetadataConfig,
    /// Blob storage configuration
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum upload size in bytes
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9710,
            workers: 4,
            max_payload_size: 1073741824, // 1GB
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to log4rs configuration file
    pub config_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `CONFIG_FILE` or `config.yaml`, then apply
    /// environment overrides. A missing file means defaults.
    pub fn load() -> CatalogResult<Self> {
        let config_path = env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(config_path: P) -> CatalogResult<Self> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            let content = fs::read_to_string(config_path).map_err(|e| {
                CatalogError::Config(format!("failed to read {}: {}", config_path.display(), e))
            })?;
            let config: AppConfig = serde_yaml::from_str(&content).map_err(|e| {
                CatalogError::Config(format!("failed to parse {}: {}", config_path.display(), e))
            })?;
            info!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            warn!("Config file {} not found, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Overlay backend settings from environment variables
    pub fn apply_env(&mut self) {
        self.metadata.apply_env();
        self.storage.apply_env();
    }
}
