//! Marketplace client configuration.

use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the off-chain item index.
    #[serde(default = "defaults::index_url")]
    pub index_url: String,

    /// Per-request timeout for index calls.
    #[serde(default = "defaults::request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Page size for collection item queries.
    #[serde(default = "defaults::page_limit")]
    pub page_limit: u32,

    #[serde(default = "defaults::newest_count")]
    pub newest_count: usize,

    #[serde(default = "defaults::filter_cache_capacity")]
    pub filter_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: defaults::index_url(),
            request_timeout_ms: defaults::request_timeout_ms(),
            page_limit: defaults::page_limit(),
            newest_count: defaults::newest_count(),
            filter_cache_capacity: defaults::filter_cache_capacity(),
        }
    }
}

impl Config {
    /// Layered load: optional `<file>.{toml,json,yaml}`, then `LEDA_*`
    /// environment variables.
    pub fn load(file: &str) -> Result<Self> {
        let config: Self = ::config::Config::builder()
            .add_source(::config::File::with_name(file).required(false))
            .add_source(::config::Environment::with_prefix("LEDA"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_limit == 0 {
            return Err(Error::Config("page_limit must be greater than 0".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be greater than 0".into()));
        }
        if !self.index_url.starts_with("http://") && !self.index_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "index_url must be an http(s) URL, got {}",
                self.index_url
            )));
        }
        Ok(())
    }
}

mod defaults {
    pub fn index_url() -> String {
        // Priority: LEDA_INDEX_URL > local index
        match std::env::var("LEDA_INDEX_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => "http://localhost:3000/api/v1".into(),
        }
    }

    pub fn request_timeout_ms() -> u64 {
        15_000
    }

    pub fn page_limit() -> u32 {
        10
    }

    pub fn newest_count() -> usize {
        5
    }

    pub fn filter_cache_capacity() -> usize {
        16
    }
}
