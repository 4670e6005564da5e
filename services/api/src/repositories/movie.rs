//! Movie repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::movie::{Category, Movie, MovieRecord};

/// Read access to the catalog store
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Movies newest first, optionally limited to one category, with the
    /// total count of matching movies
    async fn page(
        &self,
        category: Option<Category>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64)>;

    /// Movies whose title, description or category contains `needle`,
    /// ignoring case
    async fn search(&self, needle: &str) -> Result<Vec<Movie>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>>;

    /// Movies in `category` other than `exclude`, newest first
    async fn in_category(&self, category: &str, exclude: Uuid) -> Result<Vec<Movie>>;

    async fn health(&self) -> bool;
}

const MOVIE_COLUMNS: &str = "id, title, description, image, video_url, trailer_url, category, \
     year, rating::float8 AS rating, duration, maturity_rating, match_percentage, created_at";

/// Decode one row. A column mismatch is an error, not a panic, so callers
/// can fall back like on any other store failure.
fn movie_from_row(row: &PgRow) -> Result<Movie, sqlx::Error> {
    Ok(MovieRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
        video_url: row.try_get("video_url")?,
        trailer_url: row.try_get("trailer_url")?,
        category: row.try_get("category")?,
        year: row.try_get("year")?,
        rating: row.try_get("rating")?,
        duration: row.try_get("duration")?,
        maturity_rating: row.try_get("maturity_rating")?,
        match_percentage: row.try_get("match_percentage")?,
        created_at: row.try_get("created_at")?,
    }
    .into())
}

fn movies_from_rows(rows: &[PgRow]) -> Result<Vec<Movie>> {
    let movies = rows
        .iter()
        .map(movie_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(movies)
}

/// Escape LIKE wildcards so user input only matches literally
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL-backed movie store
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    /// Create a new movie store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn page(
        &self,
        category: Option<Category>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64)> {
        let category = category.map(Category::as_str);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movies WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok((movies_from_rows(&rows)?, count))
    }

    async fn search(&self, needle: &str) -> Result<Vec<Movie>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE title ILIKE $1 OR description ILIKE $1 OR category ILIKE $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(like_pattern(needle))
        .fetch_all(&self.pool)
        .await?;

        movies_from_rows(&rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(movie_from_row).transpose()?)
    }

    async fn in_category(&self, category: &str, exclude: Uuid) -> Result<Vec<Movie>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE category = $1 AND id <> $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(category)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        movies_from_rows(&rows)
    }

    async fn health(&self) -> bool {
        common::database::health_check(&self.pool)
            .await
            .unwrap_or(false)
    }
}
