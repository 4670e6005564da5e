//! Custom error types for the common library
//!
//! This module defines the storage-facing error types shared by the
//! catalog service and its infrastructure helpers.

use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error type for the Redis read-through cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis command or connection failure
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// Cached payload could not be (de)serialized
    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;
