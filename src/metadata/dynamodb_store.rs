//! DynamoDB implementation of MovieStore trait
//!
//! The "Movies" table is keyed by `MovieID` with two global secondary
//! indexes: `RatingIndex` (scanned with a numeric filter) and `GenreIndex`
//! (queried by exact genre).

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::config::MetadataConfig;
use crate::metadata::pager::{drain_pages, Page};
use crate::metadata::{Movie, MovieStore};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use log::{debug, error, info};
use serde_dynamo::{from_item, from_items, to_item, Item};
use std::collections::HashMap;

/// Primary key attribute of the movies table
pub const KEY_ATTRIBUTE: &str = "MovieID";

type Cursor = HashMap<String, AttributeValue>;

fn store_error<E: std::error::Error>(operation: &'static str) -> impl Fn(E) -> CatalogError {
    move |e| {
        let message = format!("{} failed: {}", operation, DisplayErrorContext(&e));
        error!("DynamoDB {}", message);
        CatalogError::Store(message)
    }
}

fn key(movie_id: &str) -> AttributeValue {
    AttributeValue::S(movie_id.to_string())
}

fn decode_page(
    items: Option<Vec<HashMap<String, AttributeValue>>>,
    next: Option<Cursor>,
) -> CatalogResult<Page<Movie, Cursor>> {
    let items: Vec<Movie> = from_items(items.unwrap_or_default())?;
    Ok(Page { items, next })
}

/// Movie table backed by AWS DynamoDB
#[derive(Debug, Clone)]
pub struct DynamoMovieStore {
    client: Client,
    table: String,
    rating_index: String,
    genre_index: String,
}

impl DynamoMovieStore {
    /// Build a client from the region/endpoint in `config`. Credentials come
    /// from the AWS default provider chain.
    pub async fn new(config: &MetadataConfig) -> Self {
        info!(
            "Initializing DynamoDB metadata store (table: {}, region: {})",
            config.table_name, config.region
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            debug!("Using custom DynamoDB endpoint: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        let client = Client::new(&loader.load().await);

        Self::from_client(client, config)
    }

    pub fn from_client(client: Client, config: &MetadataConfig) -> Self {
        Self {
            client,
            table: config.table_name.clone(),
            rating_index: config.rating_index.clone(),
            genre_index: config.genre_index.clone(),
        }
    }
}

#[async_trait]
impl MovieStore for DynamoMovieStore {
    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        let item: Item = to_item(movie)?;
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item.into()))
            .send()
            .await
            .map_err(store_error("PutItem"))?;

        debug!("Saved movie {}", movie.movie_id);
        Ok(())
    }

    async fn get_by_id(&self, movie_id: &str) -> CatalogResult<Option<Movie>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, key(movie_id))
            .send()
            .await
            .map_err(store_error("GetItem"))?;

        match output.item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        drain_pages(|cursor| {
            let request = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(cursor);
            async move {
                let output = request.send().await.map_err(store_error("Scan"))?;
                decode_page(output.items, output.last_evaluated_key)
            }
        })
        .await
    }

    async fn delete(&self, movie_id: &str) -> CatalogResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, key(movie_id))
            .send()
            .await
            .map_err(store_error("DeleteItem"))?;
        Ok(())
    }

    async fn query_by_rating_at_least(&self, min_rating: i32) -> CatalogResult<Vec<Movie>> {
        drain_pages(|cursor| {
            let request = self
                .client
                .scan()
                .table_name(&self.table)
                .index_name(&self.rating_index)
                .filter_expression("Rating >= :min_rating")
                .expression_attribute_values(":min_rating", AttributeValue::N(min_rating.to_string()))
                .set_exclusive_start_key(cursor);
            async move {
                let output = request.send().await.map_err(store_error("Scan RatingIndex"))?;
                decode_page(output.items, output.last_evaluated_key)
            }
        })
        .await
    }

    async fn query_by_genre(&self, genre: &str) -> CatalogResult<Vec<Movie>> {
        drain_pages(|cursor| {
            let request = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(&self.genre_index)
                .key_condition_expression("Genre = :genre")
                .expression_attribute_values(":genre", AttributeValue::S(genre.to_string()))
                .consistent_read(false)
                .set_exclusive_start_key(cursor);
            async move {
                let output = request.send().await.map_err(store_error("Query GenreIndex"))?;
                decode_page(output.items, output.last_evaluated_key)
            }
        })
        .await
    }
}
