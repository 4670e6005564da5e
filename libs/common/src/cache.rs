//! Redis cache module for the catalog service
//!
//! This module provides a small read-through cache: JSON values stored under
//! string keys with a TTL. The cache is optional; callers treat every
//! [`CacheError`] as a miss.

use crate::error::CacheResult;
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Time-to-live applied to cached entries, in seconds
    pub ttl_seconds: u64,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// Returns `None` when `REDIS_URL` is unset, which disables caching.
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL
    /// - `REDIS_CACHE_TTL_SECONDS`: Entry TTL (default: 60)
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;
        let ttl_seconds = std::env::var("REDIS_CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Some(RedisConfig { url, ttl_seconds })
    }
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    ttl_seconds: u64,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool {
            client,
            ttl_seconds: config.ttl_seconds,
        })
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> CacheResult<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Store a value as JSON under `key` with the configured TTL
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(key, payload, self.ttl_seconds).await?;
        debug!("Cached {} for {}s", key, self.ttl_seconds);
        Ok(())
    }

    /// Fetch and decode a JSON value by key
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        match value {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_disabled_without_url() {
        unsafe {
            std::env::remove_var("REDIS_URL");
        }
        assert!(RedisConfig::from_env().is_none());
    }

    #[test]
    #[serial]
    fn test_redis_config_from_env() {
        unsafe {
            std::env::set_var("REDIS_URL", "redis://cache:6379");
            std::env::set_var("REDIS_CACHE_TTL_SECONDS", "300");
        }

        let config = RedisConfig::from_env().expect("cache should be enabled");
        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.ttl_seconds, 300);

        unsafe {
            std::env::remove_var("REDIS_URL");
            std::env::remove_var("REDIS_CACHE_TTL_SECONDS");
        }
    }

    #[test]
    fn test_invalid_redis_url_is_rejected() {
        let config = RedisConfig {
            url: "not a redis url".to_string(),
            ttl_seconds: 60,
        };
        assert!(RedisPool::new(&config).is_err());
    }
}
