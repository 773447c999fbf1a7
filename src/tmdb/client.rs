//! HTTP client for the TMDB v3 API
//!
//! Issues the GET requests behind every fetch operation and deserializes
//! responses into the wire records in [`super::models`]. The orchestrator
//! depends on the [`ShowSource`] trait rather than this client directly,
//! which keeps the network edge swappable in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;

use super::models::{Genre, GenreList, Show, ShowList, ShowStub};

/// Errors that can occur when talking to TMDB
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Transport failure or undecodable response body
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("bad status: {0}")]
    BadStatus(u16),
}

/// The remote boundary the fetch orchestrator is built on
///
/// Every method maps to one HTTP GET. Implementations report failures as
/// [`TmdbError`] values and never panic; the orchestrator decides how a
/// failure degrades. [`TmdbClient`] is the production implementation,
/// tests script their own.
#[async_trait]
pub trait ShowSource: Send + Sync {
    /// Fetches one full show record, with credits and external ids appended
    async fn fetch_show(&self, id: u32, language: &str) -> Result<Show, TmdbError>;

    /// Runs a free-text show search and returns one page of stubs
    ///
    /// `page` is 0-based; the remote's page offset is an implementation
    /// detail.
    async fn search_shows(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Result<Vec<ShowStub>, TmdbError>;

    /// Fetches the TV genre list
    async fn fetch_genres(&self, language: &str) -> Result<Vec<Genre>, TmdbError>;

    /// Fetches one page of stubs from a listing endpoint such as
    /// `discover/tv` or `tv/top_rated`, with caller-supplied filter and
    /// sort parameters. `page` is 0-based.
    async fn fetch_listing_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Vec<ShowStub>, TmdbError>;
}

/// reqwest-backed [`ShowSource`] for the real TMDB API
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    /// First page number of the remote paging scheme (TMDB is 1-based)
    start_page: u32,
}

impl TmdbClient {
    /// Creates a client from the pipeline configuration
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            start_page: config.start_page,
        }
    }

    /// Translates a 0-based page index to the remote's paging scheme
    fn remote_page(&self, page: u32) -> u32 {
        self.start_page + page
    }

    /// Issues one GET against `path` and decodes the JSON response
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, TmdbError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "TMDB request");

        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::BadStatus(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ShowSource for TmdbClient {
    async fn fetch_show(&self, id: u32, language: &str) -> Result<Show, TmdbError> {
        let params = vec![
            ("api_key".to_string(), self.api_key.clone()),
            (
                "append_to_response".to_string(),
                "credits,external_ids".to_string(),
            ),
            ("language".to_string(), language.to_string()),
        ];
        self.get_json(&format!("tv/{}", id), &params).await
    }

    async fn search_shows(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Result<Vec<ShowStub>, TmdbError> {
        let params = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("query".to_string(), query.to_string()),
            ("language".to_string(), language.to_string()),
            ("page".to_string(), self.remote_page(page).to_string()),
        ];
        let list: ShowList = self.get_json("search/tv", &params).await?;
        Ok(list.results)
    }

    async fn fetch_genres(&self, language: &str) -> Result<Vec<Genre>, TmdbError> {
        let params = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("language".to_string(), language.to_string()),
        ];
        let list: GenreList = self.get_json("genre/tv/list", &params).await?;
        Ok(list.genres)
    }

    async fn fetch_listing_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Vec<ShowStub>, TmdbError> {
        let mut query = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("page".to_string(), self.remote_page(page).to_string()),
        ];
        query.extend(params.iter().cloned());

        let list: ShowList = self.get_json(endpoint, &query).await?;
        Ok(list.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> TmdbClient {
        let config = Config {
            api_key: "test-key".to_string(),
            base_url: "http://localhost:1".to_string(),
            ..Default::default()
        };
        TmdbClient::new(&config)
    }

    #[test]
    fn test_remote_page_applies_start_offset() {
        let client = test_client();
        // TMDB paging is 1-based, ours is 0-based
        assert_eq!(client.remote_page(0), 1);
        assert_eq!(client.remote_page(2), 3);
    }

    #[test]
    fn test_bad_status_display() {
        let err = TmdbError::BadStatus(404);
        assert_eq!(err.to_string(), "bad status: 404");
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error_not_a_panic() {
        // Nothing listens on port 1; the request must fail cleanly.
        let client = test_client();
        let result = client.fetch_show(1396, "en").await;
        assert!(matches!(result, Err(TmdbError::RequestFailed(_))));
    }
}
