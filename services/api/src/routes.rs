//! API service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::PathRejection},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{
        movie::{BrowseQuery, CategoryFilter, SearchQuery},
        playback::{MoviePlayback, PlaybackQuery, ResolveRequest},
    },
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/movies", get(list_movies))
        .route("/movies/search", get(search_movies))
        .route("/movies/:id", get(get_movie))
        .route("/movies/:id/similar", get(similar_movies))
        .route("/movies/:id/playback", get(get_movie_playback))
        .route("/playback/resolve", post(resolve_playback))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.catalog.store_healthy().await {
        "ok"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "ok",
        "service": "catalog-api",
        "database": database,
    }))
}

/// Get one page of movies, optionally within a category
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = match query.category.as_deref() {
        Some(category) => category.parse::<CategoryFilter>().map_err(ApiError::BadRequest)?,
        None => CategoryFilter::All,
    };
    let page = query.page.unwrap_or(0);

    let movies = state.catalog.browse(filter, page).await;
    debug!(
        "Served page {} ({} movies, {:?})",
        page,
        movies.movies.len(),
        movies.source
    );

    Ok(Json(movies))
}

/// Search movies by title, description or category
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.unwrap_or_default();
    Json(state.catalog.search(&q).await)
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let movie = state
        .catalog
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(movie))
}

/// Other movies in the same category
pub async fn similar_movies(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let similar = state
        .catalog
        .similar(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(similar))
}

/// Resolve how to play a movie's feature or trailer
pub async fn get_movie_playback(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    Query(query): Query<PlaybackQuery>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let movie = state
        .catalog
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    // The feature falls back to the trailer when no full video is stored
    let (reference, kind) = if query.trailer {
        (movie.trailer_url.as_deref(), "trailer")
    } else {
        (
            movie.video_url.as_deref().or(movie.trailer_url.as_deref()),
            "video",
        )
    };
    let reference =
        reference.ok_or_else(|| ApiError::NotFound(format!("Movie has no {}", kind)))?;

    Ok(Json(MoviePlayback {
        title: movie.title.clone(),
        poster: movie.poster.clone(),
        target: playback::resolve_playback(reference),
    }))
}

/// Resolve an arbitrary media reference
pub async fn resolve_playback(Json(payload): Json<ResolveRequest>) -> impl IntoResponse {
    Json(playback::resolve_playback(&payload.url))
}
