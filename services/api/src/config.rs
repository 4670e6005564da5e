//! Service configuration

use anyhow::{Context, Result, bail};
use std::env;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Default number of movies per catalog page
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// API service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub page_size: usize,
}

impl ApiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let page_size = match env::var("CATALOG_PAGE_SIZE") {
            Ok(value) => value
                .parse::<usize>()
                .with_context(|| format!("Invalid CATALOG_PAGE_SIZE: {}", value))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        if page_size == 0 {
            bail!("CATALOG_PAGE_SIZE must be greater than zero");
        }

        Ok(Self {
            bind_addr,
            page_size,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
