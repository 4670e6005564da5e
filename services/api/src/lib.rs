//! Catalog read API
//!
//! Serves paged browsing, search and detail reads over the movie catalog, and
//! resolves media references into playback targets for the player.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use state::AppState;
