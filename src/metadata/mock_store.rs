//! Mock implementation of MovieStore trait for testing

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::pager::{drain_pages, Page};
use crate::metadata::{Movie, MovieId, MovieStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_PAGE_SIZE: usize = 25;

/// In-memory movie table. Scans are served in pages of `page_size`
/// records so callers see the same cursor-following path as a remote table.
pub struct MockMovieStore {
    data: Arc<Mutex<BTreeMap<MovieId, Movie>>>,
    page_size: usize,
}

impl MockMovieStore {
    /// Create a new mock metadata store
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: Arc::new(Mutex::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    fn table(&self) -> CatalogResult<MutexGuard<'_, BTreeMap<MovieId, Movie>>> {
        self.data
            .lock()
            .map_err(|_| CatalogError::Store("mock table lock poisoned".to_string()))
    }

    /// Clear all data from the store (useful for test cleanup)
    pub fn clear(&self) -> CatalogResult<()> {
        self.table()?.clear();
        Ok(())
    }

    /// Number of movies in the store
    pub fn len(&self) -> CatalogResult<usize> {
        Ok(self.table()?.len())
    }

    /// One page of movies matching `filter`, starting after `cursor`
    fn scan_page<F>(&self, cursor: Option<MovieId>, filter: &F) -> CatalogResult<Page<Movie, MovieId>>
    where
        F: Fn(&Movie) -> bool,
    {
        use std::ops::Bound::{Excluded, Unbounded};

        let table = self.table()?;
        let lower = match cursor {
            Some(ref key) => Excluded(key.clone()),
            None => Unbounded,
        };

        // Like a DynamoDB scan, the page limit applies before the filter.
        let examined: Vec<&Movie> = table
            .range((lower, Unbounded))
            .map(|(_, movie)| movie)
            .take(self.page_size)
            .collect();

        let next = if examined.len() == self.page_size {
            examined.last().map(|m| m.movie_id.clone())
        } else {
            None
        };
        let items = examined.into_iter().filter(|m| filter(*m)).cloned().collect();

        Ok(Page { items, next })
    }

    async fn scan_all<F>(&self, filter: F) -> CatalogResult<Vec<Movie>>
    where
        F: Fn(&Movie) -> bool,
    {
        drain_pages(|cursor| {
            let page = self.scan_page(cursor, &filter);
            async move { page }
        })
        .await
    }
}

impl Default for MockMovieStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieStore for MockMovieStore {
    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        self.table()?.insert(movie.movie_id.clone(), movie.clone());
        Ok(())
    }

    async fn get_by_id(&self, movie_id: &str) -> CatalogResult<Option<Movie>> {
        Ok(self.table()?.get(movie_id).cloned())
    }

    async fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        self.scan_all(|_| true).await
    }

    async fn delete(&self, movie_id: &str) -> CatalogResult<()> {
        self.table()?.remove(movie_id);
        Ok(())
    }

    async fn query_by_rating_at_least(&self, min_rating: i32) -> CatalogResult<Vec<Movie>> {
        self.scan_all(|m| m.rating >= min_rating).await
    }

    async fn query_by_genre(&self, genre: &str) -> CatalogResult<Vec<Movie>> {
        let genre = genre.to_string();
        self.scan_all(move |m| m.genre == genre).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, genre: &str, rating: i32) -> Movie {
        Movie {
            movie_id: id.to_string(),
            title: format!("Title {}", id),
            genre: genre.to_string(),
            director: "Director".to_string(),
            release_time: String::new(),
            rating,
            file_url: String::new(),
            comments: String::new(),
            owner_id: 1,
        }
    }

    #[tokio::test]
    async fn test_mock_movie_store_basic_operations() {
        let store = MockMovieStore::new();
        assert_eq!(store.len().unwrap(), 0);

        let m = movie("m1", "Drama", 5);
        store.save(&m).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get_by_id("m1").await.unwrap(), Some(m.clone()));
        assert_eq!(store.get_by_id("missing").await.unwrap(), None);

        let mut replaced = m.clone();
        replaced.title = "Other".to_string();
        store.update(&replaced).await.unwrap();
        assert_eq!(store.get_by_id("m1").await.unwrap().unwrap().title, "Other");
        assert_eq!(store.len().unwrap(), 1);

        store.delete("m1").await.unwrap();
        store.delete("m1").await.unwrap();
        assert_eq!(store.get_by_id("m1").await.unwrap(), None);

        store.save(&m).await.unwrap();
        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_crosses_page_boundaries() {
        let store = MockMovieStore::with_page_size(2);
        for i in 0..7 {
            store.save(&movie(&format!("m{}", i), "Drama", i)).await.unwrap();
        }

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 7);

        // Filter applied per page: pages with no matches must not stop the scan.
        let high = store.query_by_rating_at_least(5).await.unwrap();
        let ids: Vec<_> = high.iter().map(|m| m.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["m5", "m6"]);
    }

    #[tokio::test]
    async fn test_query_by_genre() {
        let store = MockMovieStore::with_page_size(1);
        store.save(&movie("a", "SciFi", 8)).await.unwrap();
        store.save(&movie("b", "Drama", 8)).await.unwrap();
        store.save(&movie("c", "SciFi", 3)).await.unwrap();

        let scifi = store.query_by_genre("SciFi").await.unwrap();
        assert_eq!(scifi.len(), 2);
        assert!(scifi.iter().all(|m| m.genre == "SciFi"));
        assert!(store.query_by_genre("scifi").await.unwrap().is_empty());
    }
}
