//! Runtime configuration for the fetch pipeline
//!
//! Holds the TMDB API key, paging and caching knobs, and the rate limiter
//! settings. Constructed explicitly by the binary (or a host plugin) and
//! passed into the components that need it — there is no hidden global state.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL for the TMDB v3 API
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Configuration for the TMDB client, cache, and orchestrator
#[derive(Debug, Clone)]
pub struct Config {
    /// TMDB API key sent with every request
    pub api_key: String,
    /// Base URL of the TMDB API (overridable for tests)
    pub base_url: String,
    /// Preferred metadata language (ISO 639-1, e.g. "en")
    pub language: String,
    /// Number of results TMDB returns per listing page
    pub results_per_page: usize,
    /// Maximum number of pages fetched when a listing requests "all" pages
    pub max_pages: usize,
    /// First page number of the remote API (TMDB paging is 1-based)
    pub start_page: u32,
    /// How long cached shows stay fresh
    pub cache_ttl_hours: u64,
    /// Explicit cache directory; `None` uses the XDG cache dir
    pub cache_dir: Option<PathBuf>,
    /// Maximum API calls admitted per rate limiter window
    pub rate_limit_burst: usize,
    /// Length of the rate limiter window
    pub rate_limit_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: TMDB_BASE_URL.to_string(),
            language: "en".to_string(),
            results_per_page: 20,
            max_pages: 5,
            start_page: 1,
            cache_ttl_hours: 24,
            cache_dir: None,
            // TMDB historically allowed ~40 requests per 10 seconds
            rate_limit_burst: 40,
            rate_limit_window: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Creates a config with the given API key and defaults for everything else
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, TMDB_BASE_URL);
        assert_eq!(config.language, "en");
        assert_eq!(config.results_per_page, 20);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.start_page, 1);
        assert_eq!(config.cache_ttl_hours, 24);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_config_with_api_key() {
        let config = Config::with_api_key("secret");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.results_per_page, 20);
    }
}
