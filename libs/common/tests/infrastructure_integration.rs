//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache
//! are properly configured and accessible from the application. They need
//! live services and are ignored by default.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use serde::{Deserialize, Serialize};
use sqlx::Row;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct CachedTitle {
    id: String,
    title: String,
}

/// Test that verifies both PostgreSQL and Redis are accessible
/// and can perform basic operations
#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config)?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    let redis_config = RedisConfig::from_env().unwrap_or(RedisConfig {
        url: "redis://localhost:6379".to_string(),
        ttl_seconds: 10,
    });
    let redis_pool = RedisPool::new(&redis_config)?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let key = "integration_test_movie";
    let value = CachedTitle {
        id: "m-1".to_string(),
        title: "Integration".to_string(),
    };

    redis_pool.set_json(key, &value).await?;
    let retrieved: Option<CachedTitle> = redis_pool.get_json(key).await?;
    assert_eq!(retrieved, Some(value), "Redis SET/GET test failed");

    redis_pool.delete(key).await?;
    let retrieved: Option<CachedTitle> = redis_pool.get_json(key).await?;
    assert_eq!(retrieved, None, "Redis delete operation failed");

    Ok(())
}
