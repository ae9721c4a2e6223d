//! Error types shared by the stores, the movie service and the HTTP layer.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure a catalog operation can surface.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested movie does not exist
    #[error("Movie not found: {0}")]
    NotFound(String),

    /// The acting user does not own the movie
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Input is missing required fields or is malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Metadata store transport or service failure
    #[error("Metadata store error: {0}")]
    Store(String),

    /// Blob store transport or service failure
    #[error("Blob store error: {0}")]
    Blob(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// JSON error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl CatalogError {
    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "NotFound",
            CatalogError::Forbidden(_) => "Forbidden",
            CatalogError::Validation(_) => "ValidationFailed",
            CatalogError::Store(_) | CatalogError::Blob(_) => "StoreFailure",
            CatalogError::Config(_) => "ConfigError",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Store(_) | CatalogError::Blob(_) | CatalogError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Store(e.to_string())
    }
}

impl From<serde_dynamo::Error> for CatalogError {
    fn from(e: serde_dynamo::Error) -> Self {
        CatalogError::Store(format!("failed to convert movie record: {}", e))
    }
}
