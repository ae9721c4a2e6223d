//! Metadata Storage Layer Abstraction
//!
//! This module provides an abstraction over the movie metadata table,
//! allowing the system to use different storage implementations (DynamoDB,
//! SQLite, in-memory) without affecting higher-level services.

pub mod config;
pub mod dynamodb_store;
pub mod mock_store;
pub mod pager;
pub mod sqlite_store;

#[cfg(test)]
mod comprehensive_test;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// FileUrl value stored when a movie is created without an attached file
pub const NO_FILE_UPLOADED: &str = "No file uploaded";

/// Movie identifier type
pub type MovieId = String;

/// A catalog entry as persisted in the metadata table.
///
/// Optional attributes fall back to their defaults when absent from a stored
/// record; MovieID, Title, Genre and Director must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "MovieID")]
    pub movie_id: MovieId,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Director")]
    pub director: String,
    #[serde(rename = "ReleaseTime", default)]
    pub release_time: String,
    #[serde(rename = "Rating", default)]
    pub rating: i32,
    #[serde(rename = "FileUrl", default)]
    pub file_url: String,
    #[serde(rename = "Comments", default)]
    pub comments: String,
    #[serde(rename = "OwnerId", default)]
    pub owner_id: i32,
}

impl Movie {
    /// Join a new comment onto the existing ones, newline separated
    pub fn push_comment(&mut self, comment: &str) {
        if self.comments.is_empty() {
            self.comments = comment.to_string();
        } else {
            self.comments = format!("{}\n{}", self.comments, comment);
        }
    }

    /// Whether a real file URL is attached to this movie
    pub fn has_file(&self) -> bool {
        !self.file_url.is_empty() && self.file_url != NO_FILE_UPLOADED
    }
}

/// Client-supplied movie fields, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieForm {
    #[serde(rename = "MovieID", default)]
    pub movie_id: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "ReleaseTime", default)]
    pub release_time: Option<String>,
    #[serde(rename = "Rating", default)]
    pub rating: Option<i32>,
    #[serde(rename = "FileUrl", default)]
    pub file_url: Option<String>,
    #[serde(rename = "Comments", default)]
    pub comments: Option<String>,
    /// Accepted so clients may round-trip a movie document; never trusted.
    #[serde(rename = "OwnerId", default)]
    pub owner_id: Option<i32>,
    /// Object key for an attached upload
    #[serde(rename = "FileName", default)]
    pub file_name: Option<String>,
}

fn required(value: &Option<String>, field: &str) -> CatalogResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CatalogError::Validation(format!("{} is required", field))),
    }
}

impl MovieForm {
    /// Build a movie owned by `owner_id`, applying defaults to optional
    /// fields. A missing or empty MovieID is left empty for the caller to fill.
    pub fn into_movie(self, owner_id: i32) -> CatalogResult<Movie> {
        let title = required(&self.title, "Title")?;
        let genre = required(&self.genre, "Genre")?;
        let director = required(&self.director, "Director")?;

        Ok(Movie {
            movie_id: self.movie_id.unwrap_or_default(),
            title,
            genre,
            director,
            release_time: self.release_time.unwrap_or_default(),
            rating: self.rating.unwrap_or(0),
            file_url: self.file_url.unwrap_or_default(),
            comments: self.comments.unwrap_or_default(),
            owner_id,
        })
    }
}

impl From<&Movie> for MovieForm {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: Some(movie.movie_id.clone()),
            title: Some(movie.title.clone()),
            genre: Some(movie.genre.clone()),
            director: Some(movie.director.clone()),
            release_time: Some(movie.release_time.clone()),
            rating: Some(movie.rating),
            file_url: Some(movie.file_url.clone()),
            comments: Some(movie.comments.clone()),
            owner_id: Some(movie.owner_id),
            file_name: None,
        }
    }
}

/// Trait defining the movie metadata storage interface
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Insert or fully replace the record keyed by its MovieID
    async fn save(&self, movie: &Movie) -> CatalogResult<()>;

    /// Point lookup; `None` when the key does not exist
    async fn get_by_id(&self, movie_id: &str) -> CatalogResult<Option<Movie>>;

    /// Full table scan, every page collected
    async fn get_all(&self) -> CatalogResult<Vec<Movie>>;

    /// Remove a record; deleting an absent key succeeds
    async fn delete(&self, movie_id: &str) -> CatalogResult<()>;

    /// Movies rated `min_rating` or higher, via the rating index
    async fn query_by_rating_at_least(&self, min_rating: i32) -> CatalogResult<Vec<Movie>>;

    /// Movies in exactly `genre`, via the genre index; may be stale
    async fn query_by_genre(&self, genre: &str) -> CatalogResult<Vec<Movie>>;

    /// Replace an existing record. The caller keeps OwnerId intact.
    async fn update(&self, movie: &Movie) -> CatalogResult<()> {
        self.save(movie).await
    }

    /// Append a comment with a read-modify-write. A missing movie is
    /// silently ignored.
    async fn append_comment(&self, movie_id: &str, comment: &str) -> CatalogResult<()> {
        match self.get_by_id(movie_id).await? {
            Some(mut movie) => {
                movie.push_comment(comment);
                self.save(&movie).await
            }
            None => {
                log::debug!("Comment dropped, movie {} does not exist", movie_id);
                Ok(())
            }
        }
    }
}
