//! Movie service: ownership checks and field mapping on top of the stores

use bytes::Bytes;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{Movie, MovieForm, MovieStore, NO_FILE_UPLOADED};
use crate::service::user_context::UserContext;
use crate::storage::BlobStore;

/// Optional listing filters taken from the query string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFilter {
    pub min_rating: Option<i32>,
    pub genre: Option<String>,
}

/// Catalog operations. Holds no per-request state; the acting user is
/// passed to every call.
pub struct MovieService {
    movies: Arc<dyn MovieStore>,
    blobs: Arc<dyn BlobStore>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { movies, blobs }
    }

    /// List the catalog. With both filters set the rating index is queried
    /// and the genre applied to its results.
    pub async fn list(&self, filter: &MovieFilter) -> CatalogResult<Vec<Movie>> {
        let genre = filter.genre.as_deref().filter(|g| !g.is_empty());
        match (filter.min_rating, genre) {
            (Some(min), genre) => {
                let mut movies = self.movies.query_by_rating_at_least(min).await?;
                if let Some(genre) = genre {
                    movies.retain(|m| m.genre == genre);
                }
                Ok(movies)
            }
            (None, Some(genre)) => self.movies.query_by_genre(genre).await,
            (None, None) => self.movies.get_all().await,
        }
    }

    pub async fn details(&self, id: &str) -> CatalogResult<Movie> {
        self.movies
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Fetch a movie the acting user is allowed to change
    async fn owned(&self, ctx: &UserContext, id: &str) -> CatalogResult<Movie> {
        let movie = self.details(id).await?;
        if !ctx.owns(movie.owner_id) {
            warn!(
                "User {} denied access to movie {} owned by {}",
                ctx.user_id, id, movie.owner_id
            );
            return Err(CatalogError::Forbidden(format!(
                "user {} does not own movie {}",
                ctx.user_id, id
            )));
        }
        Ok(movie)
    }

    /// Movie to prefill the edit form
    pub async fn edit_view(&self, ctx: &UserContext, id: &str) -> CatalogResult<Movie> {
        self.owned(ctx, id).await
    }

    /// Movie shown on the delete confirmation page
    pub async fn delete_view(&self, ctx: &UserContext, id: &str) -> CatalogResult<Movie> {
        self.owned(ctx, id).await
    }

    /// Create a movie owned by the acting user. An attached non-empty file
    /// is uploaded under the form's FileName before anything is persisted.
    pub async fn create(
        &self,
        ctx: &UserContext,
        form: MovieForm,
        file: Option<Bytes>,
    ) -> CatalogResult<Movie> {
        let file_name = form.file_name.clone();
        let mut movie = form.into_movie(ctx.user_id)?;
        if movie.movie_id.trim().is_empty() {
            movie.movie_id = Uuid::new_v4().to_string();
        } else if let Some(existing) = self.movies.get_by_id(&movie.movie_id).await? {
            // A client-chosen id must not replace someone's record
            if !ctx.owns(existing.owner_id) {
                warn!(
                    "User {} tried to create over movie {} owned by {}",
                    ctx.user_id, existing.movie_id, existing.owner_id
                );
                return Err(CatalogError::Forbidden(format!(
                    "movie {} belongs to another user",
                    existing.movie_id
                )));
            }
            return Err(CatalogError::Validation(format!(
                "movie {} already exists",
                existing.movie_id
            )));
        }

        match file.filter(|data| !data.is_empty()) {
            Some(data) => {
                let key = file_name
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| {
                        CatalogError::Validation("FileName is required with an attached file".to_string())
                    })?;
                movie.file_url = self.blobs.upload(&key, data).await?;
            }
            None if movie.file_url.is_empty() => {
                movie.file_url = NO_FILE_UPLOADED.to_string();
            }
            None => {}
        }

        self.movies.save(&movie).await?;
        info!("User {} created movie {} ({})", ctx.user_id, movie.movie_id, movie.title);
        Ok(movie)
    }

    /// Replace a movie with the submitted form. The stored owner is kept.
    pub async fn update(&self, ctx: &UserContext, id: &str, form: MovieForm) -> CatalogResult<Movie> {
        let existing = self.owned(ctx, id).await?;

        let mut movie = form.into_movie(existing.owner_id)?;
        movie.movie_id = existing.movie_id;
        self.movies.update(&movie).await?;

        info!("User {} updated movie {}", ctx.user_id, id);
        Ok(movie)
    }

    pub async fn delete(&self, ctx: &UserContext, id: &str) -> CatalogResult<()> {
        self.owned(ctx, id).await?;
        self.movies.delete(id).await?;
        info!("User {} deleted movie {}", ctx.user_id, id);
        Ok(())
    }

    /// Append a comment. Unknown movies are ignored by the store.
    pub async fn append_comment(&self, ctx: &UserContext, id: &str, text: &str) -> CatalogResult<()> {
        if text.trim().is_empty() {
            return Err(CatalogError::Validation("Comment must not be empty".to_string()));
        }
        debug!("User {} commenting on movie {}", ctx.user_id, id);
        self.movies.append_comment(id, text).await
    }

    /// URL of the movie's uploaded file
    pub async fn download_url(&self, id: &str) -> CatalogResult<String> {
        let movie = self.details(id).await?;
        if !movie.has_file() {
            return Err(CatalogError::NotFound(format!("no file uploaded for movie {}", id)));
        }
        Ok(movie.file_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::mock_store::MockMovieStore;
    use crate::storage::mock_store::MockBlobStore;

    struct Fixture {
        movies: Arc<MockMovieStore>,
        blobs: Arc<MockBlobStore>,
        service: MovieService,
    }

    fn fixture() -> Fixture {
        let movies = Arc::new(MockMovieStore::with_page_size(2));
        let blobs = Arc::new(MockBlobStore::new("movie-bucket", "s3.amazonaws.com"));
        let service = MovieService::new(movies.clone(), blobs.clone());
        Fixture { movies, blobs, service }
    }

    fn form(title: &str, genre: &str, rating: i32) -> MovieForm {
        MovieForm {
            title: Some(title.to_string()),
            genre: Some(genre.to_string()),
            director: Some("Nolan".to_string()),
            rating: Some(rating),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_without_file() {
        let fx = fixture();
        let owner = UserContext::new(42);

        let movie = fx.service.create(&owner, form("Inception", "SciFi", 9), None).await.unwrap();
        assert_eq!(movie.owner_id, 42);
        assert_eq!(movie.file_url, NO_FILE_UPLOADED);
        assert_eq!(movie.comments, "");
        assert!(Uuid::parse_str(&movie.movie_id).is_ok());

        let stored = fx.movies.get_by_id(&movie.movie_id).await.unwrap();
        assert_eq!(stored, Some(movie));
    }

    #[tokio::test]
    async fn test_create_ignores_client_owner_and_keeps_given_id() {
        let fx = fixture();
        let mut input = form("Heat", "Crime", 8);
        input.movie_id = Some("heat-1995".to_string());
        input.owner_id = Some(1);

        let movie = fx.service.create(&UserContext::new(5), input, None).await.unwrap();
        assert_eq!(movie.movie_id, "heat-1995");
        assert_eq!(movie.owner_id, 5);
    }

    #[tokio::test]
    async fn test_create_with_taken_id_changes_nothing() {
        let fx = fixture();
        let original = fx
            .service
            .create(&UserContext::new(42), form("Inception", "SciFi", 9), None)
            .await
            .unwrap();

        let mut hijack = form("Hijacked", "SciFi", 1);
        hijack.movie_id = Some(original.movie_id.clone());
        hijack.file_name = Some("hijack.mp4".to_string());
        let result = fx
            .service
            .create(&UserContext::new(7), hijack.clone(), Some(Bytes::from_static(b"x")))
            .await;
        assert!(matches!(result, Err(CatalogError::Forbidden(_))));

        // The owner cannot recreate it either
        let result = fx.service.create(&UserContext::new(42), hijack, None).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));

        let stored = fx.movies.get_by_id(&original.movie_id).await.unwrap().unwrap();
        assert_eq!(stored, original);
        assert_eq!(stored.owner_id, 42);
        assert_eq!(fx.blobs.object_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_file_uploads_first() {
        let fx = fixture();
        let mut input = form("Alien", "Horror", 8);
        input.file_name = Some("alien.mp4".to_string());

        let movie = fx
            .service
            .create(&UserContext::new(1), input, Some(Bytes::from_static(b"frames")))
            .await
            .unwrap();
        assert_eq!(movie.file_url, "https://movie-bucket.s3.amazonaws.com/alien.mp4");
        assert_eq!(fx.blobs.get("alien.mp4").unwrap(), Some(Bytes::from_static(b"frames")));
    }

    #[tokio::test]
    async fn test_empty_file_counts_as_no_file() {
        let fx = fixture();
        let movie = fx
            .service
            .create(&UserContext::new(1), form("Alien", "Horror", 8), Some(Bytes::new()))
            .await
            .unwrap();
        assert_eq!(movie.file_url, NO_FILE_UPLOADED);
        assert_eq!(fx.blobs.object_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_upload_persists_nothing() {
        let fx = fixture();
        fx.blobs.set_fail_uploads(true);
        let mut input = form("Alien", "Horror", 8);
        input.file_name = Some("alien.mp4".to_string());

        let result = fx
            .service
            .create(&UserContext::new(1), input, Some(Bytes::from_static(b"frames")))
            .await;
        assert!(matches!(result, Err(CatalogError::Blob(_))));
        assert_eq!(fx.movies.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let fx = fixture();
        let mut input = form("", "Horror", 8);
        input.title = Some("   ".to_string());

        let result = fx.service.create(&UserContext::new(1), input, None).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(fx.movies.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_id() {
        let fx = fixture();
        let owner = UserContext::new(42);
        let movie = fx.service.create(&owner, form("Inception", "SciFi", 9), None).await.unwrap();

        let mut edit = form("Inception (Director's Cut)", "SciFi", 10);
        edit.movie_id = Some("something-else".to_string());
        edit.owner_id = Some(7);
        let updated = fx.service.update(&owner, &movie.movie_id, edit).await.unwrap();

        assert_eq!(updated.movie_id, movie.movie_id);
        assert_eq!(updated.owner_id, 42);
        assert_eq!(updated.rating, 10);
        assert_eq!(fx.movies.get_by_id(&movie.movie_id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_non_owner_update_is_forbidden_and_changes_nothing() {
        let fx = fixture();
        let movie = fx
            .service
            .create(&UserContext::new(42), form("Inception", "SciFi", 9), None)
            .await
            .unwrap();

        let result = fx
            .service
            .update(&UserContext::new(7), &movie.movie_id, form("Hijacked", "SciFi", 1))
            .await;
        assert!(matches!(result, Err(CatalogError::Forbidden(_))));
        assert_eq!(fx.movies.get_by_id(&movie.movie_id).await.unwrap(), Some(movie));
    }

    #[tokio::test]
    async fn test_invalid_update_changes_nothing() {
        let fx = fixture();
        let owner = UserContext::new(42);
        let movie = fx.service.create(&owner, form("Inception", "SciFi", 9), None).await.unwrap();

        let mut edit = form("Inception", "SciFi", 10);
        edit.director = None;
        let result = fx.service.update(&owner, &movie.movie_id, edit).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(fx.movies.get_by_id(&movie.movie_id).await.unwrap(), Some(movie));
    }

    #[tokio::test]
    async fn test_update_missing_movie_is_not_found() {
        let fx = fixture();
        let result = fx
            .service
            .update(&UserContext::new(1), "missing", form("X", "Y", 1))
            .await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_non_owner_delete_is_forbidden() {
        let fx = fixture();
        let movie = fx
            .service
            .create(&UserContext::new(42), form("Inception", "SciFi", 9), None)
            .await
            .unwrap();
        let before = fx.service.list(&MovieFilter::default()).await.unwrap();

        let result = fx.service.delete(&UserContext::new(7), &movie.movie_id).await;
        assert!(matches!(result, Err(CatalogError::Forbidden(_))));
        assert_eq!(fx.service.list(&MovieFilter::default()).await.unwrap(), before);

        fx.service.delete(&UserContext::new(42), &movie.movie_id).await.unwrap();
        assert!(fx.service.list(&MovieFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_views_check_ownership() {
        let fx = fixture();
        let movie = fx
            .service
            .create(&UserContext::new(42), form("Inception", "SciFi", 9), None)
            .await
            .unwrap();
        let owner = UserContext::new(42);
        let stranger = UserContext::new(7);

        assert_eq!(fx.service.edit_view(&owner, &movie.movie_id).await.unwrap(), movie);
        assert_eq!(fx.service.delete_view(&owner, &movie.movie_id).await.unwrap(), movie);
        assert!(matches!(
            fx.service.edit_view(&stranger, &movie.movie_id).await,
            Err(CatalogError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.delete_view(&stranger, "missing").await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_comments() {
        let fx = fixture();
        let ctx = UserContext::new(3);
        let movie = fx.service.create(&ctx, form("Heat", "Crime", 8), None).await.unwrap();

        // Anyone may comment
        fx.service.append_comment(&ctx, &movie.movie_id, "x").await.unwrap();
        fx.service
            .append_comment(&UserContext::new(9), &movie.movie_id, "y")
            .await
            .unwrap();
        assert_eq!(fx.service.details(&movie.movie_id).await.unwrap().comments, "x\ny");

        assert!(fx.service.append_comment(&ctx, "missing", "z").await.is_ok());
        assert!(matches!(
            fx.service.append_comment(&ctx, &movie.movie_id, "  ").await,
            Err(CatalogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let fx = fixture();
        let ctx = UserContext::new(1);
        for (title, genre, rating) in [
            ("Inception", "SciFi", 9),
            ("Alien", "Horror", 8),
            ("Heat", "Crime", 8),
            ("Cats", "Musical", 3),
            ("Dune", "SciFi", 6),
        ] {
            fx.service.create(&ctx, form(title, genre, rating), None).await.unwrap();
        }

        assert_eq!(fx.service.list(&MovieFilter::default()).await.unwrap().len(), 5);

        let good = fx
            .service
            .list(&MovieFilter { min_rating: Some(7), genre: None })
            .await
            .unwrap();
        assert_eq!(good.len(), 3);
        assert!(good.iter().all(|m| m.rating >= 7));

        let scifi = fx
            .service
            .list(&MovieFilter { min_rating: None, genre: Some("SciFi".to_string()) })
            .await
            .unwrap();
        assert_eq!(scifi.len(), 2);

        let good_scifi = fx
            .service
            .list(&MovieFilter { min_rating: Some(7), genre: Some("SciFi".to_string()) })
            .await
            .unwrap();
        assert_eq!(good_scifi.len(), 1);
        assert_eq!(good_scifi[0].title, "Inception");
    }

    #[tokio::test]
    async fn test_download_url() {
        let fx = fixture();
        let ctx = UserContext::new(1);
        let bare = fx.service.create(&ctx, form("Heat", "Crime", 8), None).await.unwrap();
        let mut input = form("Alien", "Horror", 8);
        input.file_name = Some("alien.mp4".to_string());
        let with_file = fx
            .service
            .create(&ctx, input, Some(Bytes::from_static(b"frames")))
            .await
            .unwrap();

        assert_eq!(
            fx.service.download_url(&with_file.movie_id).await.unwrap(),
            "https://movie-bucket.s3.amazonaws.com/alien.mp4"
        );
        assert!(matches!(
            fx.service.download_url(&bare.movie_id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.download_url("missing").await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
