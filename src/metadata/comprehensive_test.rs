//! Comprehensive test to verify the metadata storage abstraction

#[cfg(test)]
mod integration_tests {
    use crate::metadata::config::{MetadataBackend, MetadataConfig};
    use crate::metadata::mock_store::MockMovieStore;
    use crate::metadata::sqlite_store::SQLiteMovieStore;
    use crate::metadata::{Movie, MovieStore};
    use std::sync::Arc;

    fn sample(id: &str, genre: &str, rating: i32) -> Movie {
        Movie {
            movie_id: id.to_string(),
            title: format!("Movie {}", id),
            genre: genre.to_string(),
            director: "Someone".to_string(),
            release_time: "2010-07-16".to_string(),
            rating,
            file_url: String::new(),
            comments: String::new(),
            owner_id: 42,
        }
    }

    fn backends() -> Vec<(&'static str, Arc<dyn MovieStore>)> {
        vec![
            ("sqlite", Arc::new(SQLiteMovieStore::open_in_memory().expect("sqlite store"))),
            ("mock", Arc::new(MockMovieStore::with_page_size(2))),
        ]
    }

    #[tokio::test]
    async fn test_save_then_get_returns_equal_record() {
        for (name, store) in backends() {
            let mut m = sample("m1", "SciFi", 9);
            m.file_url = "https://movies.s3.amazonaws.com/inception.mp4".to_string();
            m.comments = "great".to_string();
            store.save(&m).await.expect("save");
            assert_eq!(store.get_by_id("m1").await.expect("get"), Some(m), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        for (name, store) in backends() {
            store.save(&sample("gone", "Drama", 1)).await.expect("save");
            store.delete("gone").await.expect("first delete");
            store.delete("gone").await.expect("second delete");
            assert!(store.get_by_id("gone").await.expect("get").is_none(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_append_comment_joins_with_newline() {
        for (name, store) in backends() {
            store.save(&sample("c1", "Drama", 5)).await.expect("save");
            store.append_comment("c1", "x").await.expect("append x");
            store.append_comment("c1", "y").await.expect("append y");
            let movie = store.get_by_id("c1").await.expect("get").expect("present");
            assert_eq!(movie.comments, "x\ny", "{}", name);
        }
    }

    #[tokio::test]
    async fn test_append_comment_on_missing_movie_is_noop() {
        for (name, store) in backends() {
            store.append_comment("ghost", "hello").await.expect("append");
            assert!(store.get_by_id("ghost").await.expect("get").is_none(), "{}", name);
            assert!(store.get_all().await.expect("scan").is_empty(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_rating_query_is_filtered_subset_of_scan() {
        for (name, store) in backends() {
            for (i, rating) in [3, 7, 9, 6, 10, 7, 0].iter().enumerate() {
                store.save(&sample(&format!("r{}", i), "Drama", *rating)).await.expect("save");
            }

            let all = store.get_all().await.expect("scan");
            let high = store.query_by_rating_at_least(7).await.expect("rating query");

            assert_eq!(all.len(), 7, "{}", name);
            assert_eq!(high.len(), 4, "{}", name);
            assert!(high.iter().all(|m| m.rating >= 7), "{}", name);
            assert!(high.iter().all(|m| all.contains(m)), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_genre_query_exact_match() {
        for (name, store) in backends() {
            store.save(&sample("g1", "SciFi", 1)).await.expect("save");
            store.save(&sample("g2", "Drama", 1)).await.expect("save");
            store.save(&sample("g3", "SciFi", 1)).await.expect("save");
            store.save(&sample("g4", "SciFi Horror", 1)).await.expect("save");

            let mut ids: Vec<String> = store
                .query_by_genre("SciFi")
                .await
                .expect("genre query")
                .into_iter()
                .map(|m| m.movie_id)
                .collect();
            ids.sort();
            assert_eq!(ids, vec!["g1", "g3"], "{}", name);
        }
    }

    #[tokio::test]
    async fn test_store_created_from_config() {
        let config = MetadataConfig { backend: MetadataBackend::Mock, ..Default::default() };
        let store = config.create_store().await.expect("create store");

        store.save(&sample("cfg", "Drama", 2)).await.expect("save");
        let mut updated = sample("cfg", "Drama", 8);
        updated.title = "Renamed".to_string();
        store.update(&updated).await.expect("update");

        assert_eq!(store.get_by_id("cfg").await.expect("get"), Some(updated));
        assert_eq!(store.get_all().await.expect("scan").len(), 1);
    }
}
