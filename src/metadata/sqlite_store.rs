//! SQLite implementation of MovieStore trait

use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{Movie, MovieStore};
use async_trait::async_trait;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS movies (
        movie_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        genre TEXT NOT NULL,
        director TEXT NOT NULL,
        release_time TEXT NOT NULL DEFAULT '',
        rating INTEGER NOT NULL DEFAULT 0,
        file_url TEXT NOT NULL DEFAULT '',
        comments TEXT NOT NULL DEFAULT '',
        owner_id INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS movies_rating_idx ON movies (rating);
    CREATE INDEX IF NOT EXISTS movies_genre_idx ON movies (genre);
";

const COLUMNS: &str =
    "movie_id, title, genre, director, release_time, rating, file_url, comments, owner_id";

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        movie_id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        director: row.get(3)?,
        release_time: row.get(4)?,
        rating: row.get(5)?,
        file_url: row.get(6)?,
        comments: row.get(7)?,
        owner_id: row.get(8)?,
    })
}

/// SQLite implementation of MovieStore, for running without AWS
pub struct SQLiteMovieStore {
    conn: Mutex<Connection>,
}

impl SQLiteMovieStore {
    /// Open (creating if needed) the database file at `db_path`
    pub fn open<P: AsRef<Path>>(db_path: P) -> CatalogResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CatalogError::Store(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        info!("Opening SQLite metadata store at {}", db_path.display());
        Self::from_connection(Connection::open(db_path)?)
    }

    /// In-memory database, gone when the store is dropped
    pub fn open_in_memory() -> CatalogResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CatalogResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Switch the journal to WAL mode
    pub fn enable_wal(&self) -> CatalogResult<()> {
        let conn = self.conn()?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        info!("SQLite journal mode: {}", mode);
        Ok(())
    }

    fn conn(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Store("sqlite connection lock poisoned".to_string()))
    }

    fn select(&self, clause: &str, params: &[&dyn rusqlite::ToSql]) -> CatalogResult<Vec<Movie>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM movies {}", COLUMNS, clause);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, movie_from_row)?;

        let mut movies = Vec::new();
        for row in rows {
            movies.push(row?);
        }
        Ok(movies)
    }
}

#[async_trait]
impl MovieStore for SQLiteMovieStore {
    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!("INSERT OR REPLACE INTO movies ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", COLUMNS),
            params![
                movie.movie_id,
                movie.title,
                movie.genre,
                movie.director,
                movie.release_time,
                movie.rating,
                movie.file_url,
                movie.comments,
                movie.owner_id,
            ],
        )?;
        Ok(())
    }

    async fn get_by_id(&self, movie_id: &str) -> CatalogResult<Option<Movie>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM movies WHERE movie_id = ?1", COLUMNS);
        let movie = conn
            .query_row(&sql, params![movie_id], movie_from_row)
            .optional()?;
        Ok(movie)
    }

    async fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        self.select("ORDER BY movie_id", &[])
    }

    async fn delete(&self, movie_id: &str) -> CatalogResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM movies WHERE movie_id = ?1", params![movie_id])?;
        Ok(())
    }

    async fn query_by_rating_at_least(&self, min_rating: i32) -> CatalogResult<Vec<Movie>> {
        self.select("WHERE rating >= ?1 ORDER BY movie_id", &[&min_rating])
    }

    async fn query_by_genre(&self, genre: &str) -> CatalogResult<Vec<Movie>> {
        self.select("WHERE genre = ?1 ORDER BY movie_id", &[&genre])
    }
}
