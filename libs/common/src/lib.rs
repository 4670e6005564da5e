//! Common library for the catalog workspace
//!
//! This crate provides the storage plumbing shared by the services: the
//! PostgreSQL pool, the optional Redis read-through cache, and their error
//! types.
//!
//! ```rust,no_run
//! use common::{
//!     cache::{RedisConfig, RedisPool},
//!     database::{DatabaseConfig, health_check, init_pool},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_pool(&DatabaseConfig::from_env()?)?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!
//!     if let Some(config) = RedisConfig::from_env() {
//!         let cache = RedisPool::new(&config)?;
//!         cache.set_json("greeting", &"hello").await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
