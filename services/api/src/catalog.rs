//! Catalog reads with bundled fallback and read-through cache
//!
//! The store is the source of truth. When it fails, browse, search and detail
//! reads are answered from the catalog compiled into the binary and marked as
//! fallback. A store that answers with nothing is taken at its word.

use anyhow::{Context, Result};
use common::cache::RedisPool;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    models::movie::{
        CatalogSource, CategoryFilter, MIN_SEARCH_LEN, Movie, MovieList, MoviePage,
    },
    repositories::MovieStore,
};

const BUNDLED_CATALOG: &str = include_str!("../data/movies.json");

/// Parse the catalog shipped with the service, newest first
pub fn bundled_catalog() -> Result<Vec<Movie>> {
    let mut movies: Vec<Movie> =
        serde_json::from_str(BUNDLED_CATALOG).context("Failed to parse bundled catalog")?;
    movies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(movies)
}

fn cache_key(id: Uuid) -> String {
    format!("movie:{}", id)
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn MovieStore>,
    fallback: Arc<Vec<Movie>>,
    cache: Option<RedisPool>,
    page_size: usize,
}

impl CatalogService {
    pub fn new(store: Arc<dyn MovieStore>, fallback: Vec<Movie>, page_size: usize) -> Self {
        Self {
            store,
            fallback: Arc::new(fallback),
            cache: None,
            page_size: page_size.max(1),
        }
    }

    pub fn with_cache(mut self, cache: RedisPool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// One page of movies, newest first
    pub async fn browse(&self, filter: CategoryFilter, page: u32) -> MoviePage {
        let offset = i64::from(page) * self.page_size as i64;

        match self
            .store
            .page(filter.category(), offset, self.page_size as i64)
            .await
        {
            Ok((movies, total)) => MoviePage::new(
                movies,
                page,
                self.page_size,
                u64::try_from(total).unwrap_or(0),
                CatalogSource::Remote,
            ),
            Err(e) => {
                warn!("Catalog store unavailable, serving bundled page: {:#}", e);
                self.fallback_page(filter, page)
            }
        }
    }

    fn fallback_page(&self, filter: CategoryFilter, page: u32) -> MoviePage {
        let matching: Vec<&Movie> = self.fallback.iter().filter(|m| filter.admits(m)).collect();
        let start = (page as usize).saturating_mul(self.page_size);
        let movies = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|m| (*m).clone())
            .collect();

        MoviePage::new(
            movies,
            page,
            self.page_size,
            matching.len() as u64,
            CatalogSource::Fallback,
        )
    }

    /// Movies matching `query`. Queries shorter than two characters match nothing.
    pub async fn search(&self, query: &str) -> MovieList {
        if query.chars().count() < MIN_SEARCH_LEN {
            return MovieList {
                movies: Vec::new(),
                source: CatalogSource::Remote,
            };
        }

        match self.store.search(query).await {
            Ok(movies) => MovieList {
                movies,
                source: CatalogSource::Remote,
            },
            Err(e) => {
                warn!("Catalog store unavailable, searching bundled catalog: {:#}", e);
                let needle = query.to_lowercase();
                MovieList {
                    movies: self
                        .fallback
                        .iter()
                        .filter(|m| m.matches(&needle))
                        .cloned()
                        .collect(),
                    source: CatalogSource::Fallback,
                }
            }
        }
    }

    async fn cached(&self, id: Uuid) -> Option<Movie> {
        let cache = self.cache.as_ref()?;
        match cache.get_json::<Movie>(&cache_key(id)).await {
            Ok(movie) => movie,
            Err(e) => {
                warn!("Movie cache read failed: {}", e);
                None
            }
        }
    }

    async fn remember(&self, movie: &Movie) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_json(&cache_key(movie.id), movie).await {
                warn!("Movie cache write failed: {}", e);
            }
        }
    }

    /// Look up one movie
    pub async fn get(&self, id: Uuid) -> Option<Movie> {
        if let Some(movie) = self.cached(id).await {
            debug!("Movie {} served from cache", id);
            return Some(movie);
        }

        match self.store.find_by_id(id).await {
            Ok(Some(movie)) => {
                self.remember(&movie).await;
                Some(movie)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Catalog store unavailable, looking up {} in bundled catalog: {:#}", id, e);
                self.fallback.iter().find(|m| m.id == id).cloned()
            }
        }
    }

    /// Other movies in the same category as `id`, newest first.
    /// `None` when the movie itself is unknown.
    pub async fn similar(&self, id: Uuid) -> Option<MovieList> {
        let movie = self.get(id).await?;

        let list = match self.store.in_category(&movie.category, id).await {
            Ok(movies) => MovieList {
                movies,
                source: CatalogSource::Remote,
            },
            Err(e) => {
                warn!("Catalog store unavailable, finding similar movies in bundled catalog: {:#}", e);
                MovieList {
                    movies: self
                        .fallback
                        .iter()
                        .filter(|m| m.category == movie.category && m.id != id)
                        .cloned()
                        .collect(),
                    source: CatalogSource::Fallback,
                }
            }
        };
        Some(list)
    }

    pub async fn store_healthy(&self) -> bool {
        self.store.health().await
    }
}
