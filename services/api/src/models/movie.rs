//! Movie models for the catalog

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Maturity rating shown when the store has none
pub const DEFAULT_MATURITY_RATING: &str = "PG-13";

/// Minimum query length before a search runs
pub const MIN_SEARCH_LEN: usize = 2;

/// Movie as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub poster: String,
    pub category: String,
    pub year: i32,
    pub rating: f64,
    pub duration: String,
    pub maturity_rating: String,
    pub match_percentage: i32,
    pub video_url: Option<String>,
    pub trailer_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movie {
    /// Case-insensitive substring match on title, description and category.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

/// A `movies` row; every column but id, title, category and timestamps is nullable
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub video_url: Option<String>,
    pub trailer_url: Option<String>,
    pub category: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub maturity_rating: Option<String>,
    pub match_percentage: Option<i32>,
    pub created_at: DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Movie {
            id: record.id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            poster: record.image.unwrap_or_default(),
            category: record.category,
            year: record.year.unwrap_or_else(|| Utc::now().year()),
            rating: record.rating.unwrap_or(0.0),
            duration: record.duration.unwrap_or_default(),
            maturity_rating: non_empty(record.maturity_rating)
                .unwrap_or_else(|| DEFAULT_MATURITY_RATING.to_string()),
            match_percentage: record.match_percentage.unwrap_or(0),
            video_url: non_empty(record.video_url),
            trailer_url: non_empty(record.trailer_url),
            created_at: record.created_at,
        }
    }
}

/// Browsable movie categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Action,
    Drama,
    Comedy,
    Thriller,
    Horror,
    SciFi,
    Romance,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Action,
        Category::Drama,
        Category::Comedy,
        Category::Thriller,
        Category::Horror,
        Category::SciFi,
        Category::Romance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Action => "action",
            Category::Drama => "drama",
            Category::Comedy => "comedy",
            Category::Thriller => "thriller",
            Category::Horror => "horror",
            Category::SciFi => "sci-fi",
            Category::Romance => "romance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category selection for browsing; `all` disables filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn category(self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(category),
        }
    }

    pub fn admits(self, movie: &Movie) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => movie.category == category.as_str(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(CategoryFilter::All);
        }

        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .map(CategoryFilter::Only)
            .ok_or_else(|| format!("Unknown category: {}", value))
    }
}

/// Where a response's movies came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// The catalog store
    Remote,
    /// The bundled catalog, served because the store failed
    Fallback,
}

/// Query parameters for paged browsing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseQuery {
    /// Zero-based page number
    pub page: Option<u32>,
    pub category: Option<String>,
}

/// Query parameters for search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// One page of an infinite-scroll listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub next_page: Option<u32>,
    pub total_count: u64,
    pub source: CatalogSource,
}

impl MoviePage {
    pub fn new(
        movies: Vec<Movie>,
        page: u32,
        page_size: usize,
        total_count: u64,
        source: CatalogSource,
    ) -> Self {
        Self {
            movies,
            page,
            next_page: next_page(page, page_size, total_count),
            total_count,
            source,
        }
    }
}

/// Unpaged movie list (search results)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub source: CatalogSource,
}

/// `page + 1` while `(page + 1) * page_size < total_count`
pub fn next_page(page: u32, page_size: usize, total_count: u64) -> Option<u32> {
    let seen = (u64::from(page) + 1).saturating_mul(page_size as u64);
    (seen < total_count).then_some(page + 1)
}
