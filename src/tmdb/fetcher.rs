//! Fetch orchestration: cache-aside lookups, concurrent batches, and
//! multi-page listings
//!
//! [`ShowFetcher`] composes the cache store, rate limiter, remote source,
//! and failure reporter into the operations the host actually calls. The
//! scheduling model is fork-join: batch operations fan out one future per
//! entity or page, join them all before returning, and keep output order
//! equal to input order because every future owns exactly one result slot.
//! Failures never cross slots — a dead page or entity leaves `None` behind
//! and its siblings complete untouched.

use std::sync::Arc;

use chrono::Utc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::limiter::RateLimiter;
use crate::report::{Reporter, TracingReporter};

use super::client::{ShowSource, TmdbClient, TmdbError};
use super::models::{Genre, Show};

/// Which listing pages to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    /// Exactly one 0-based page
    Page(u32),
    /// All pages up to the configured maximum, fetched concurrently
    All,
}

/// Cache key for a show in a given language
fn show_cache_key(id: u32, language: &str) -> String {
    format!("com.tmdb.show.{}.{}", id, language)
}

/// Today's date as the `YYYY-MM-DD` form TMDB date filters expect
fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Rate-limited, cache-backed fetch pipeline for TMDB shows
///
/// All fallible remote work degrades gracefully: a failed fetch is logged,
/// surfaced through the [`Reporter`], and reported to the caller as an
/// absent value. Batch operations always return, with partial results
/// preferred over total failure. There is no retry policy; a failed call is
/// terminal for that one request.
pub struct ShowFetcher {
    source: Arc<dyn ShowSource>,
    cache: CacheStore,
    limiter: RateLimiter,
    reporter: Arc<dyn Reporter>,
    results_per_page: usize,
    max_pages: usize,
    cache_ttl_hours: u64,
}

impl ShowFetcher {
    /// Creates a fetcher from explicitly constructed components
    ///
    /// The limiter and reporter are injected rather than global so tests can
    /// pass a permissive limiter and a capturing reporter.
    pub fn new(
        source: Arc<dyn ShowSource>,
        cache: CacheStore,
        limiter: RateLimiter,
        reporter: Arc<dyn Reporter>,
        config: &Config,
    ) -> Self {
        Self {
            source,
            cache,
            limiter,
            reporter,
            results_per_page: config.results_per_page,
            max_pages: config.max_pages,
            cache_ttl_hours: config.cache_ttl_hours,
        }
    }

    /// Creates a production fetcher: real client, XDG cache, TMDB rate limit
    pub fn from_config(config: &Config) -> Self {
        let cache = match &config.cache_dir {
            Some(dir) => CacheStore::with_dir(dir.clone()),
            // Fall back to a temp dir when no home directory exists
            None => CacheStore::new()
                .unwrap_or_else(|| CacheStore::with_dir(std::env::temp_dir().join("showfetch"))),
        };
        Self::new(
            Arc::new(TmdbClient::new(config)),
            cache,
            RateLimiter::new(config.rate_limit_burst, config.rate_limit_window),
            Arc::new(TracingReporter),
            config,
        )
    }

    /// Logs a failed operation and fires the one-line user notification
    ///
    /// Applied uniformly to every remote operation, listing pages included.
    fn report_failure(&self, operation: &str, err: &TmdbError) {
        let message = match err {
            TmdbError::BadStatus(code) => format!("{} bad status: {}", operation, code),
            _ => format!("{} failed, check your logs.", operation),
        };
        tracing::error!(error = %err, "{} failed", operation);
        self.reporter.notify(&message);
    }

    /// Fetches one show, cache-aside
    ///
    /// A fresh cache entry is returned without touching the network. On a
    /// miss (including soft-expired and corrupt entries) the fetch goes
    /// through the rate limiter; success is written back with the configured
    /// TTL, failure is reported and returned as `None`.
    pub async fn get_show(&self, id: u32, language: &str) -> Option<Show> {
        let key = show_cache_key(id, language);
        if let Some(show) = self.cache.get::<Show>(&key) {
            return Some(show);
        }

        match self.limiter.call(self.source.fetch_show(id, language)).await {
            Ok(show) => {
                if let Err(e) = self.cache.set(&key, &show, self.cache_ttl_hours) {
                    tracing::warn!(key = %key, error = %e, "failed to write cache entry");
                }
                Some(show)
            }
            Err(e) => {
                self.report_failure("GetShow", &e);
                None
            }
        }
    }

    /// Fetches a batch of shows concurrently, preserving input order
    ///
    /// `result[i]` corresponds to `ids[i]`. Fan-out is unbounded because
    /// each individual fetch is itself rate-limited; a failed fetch leaves
    /// only its own slot `None`.
    pub async fn get_shows(&self, ids: &[u32], language: &str) -> Vec<Option<Show>> {
        let fetches = ids.iter().map(|&id| self.get_show(id, language));
        futures::future::join_all(fetches).await
    }

    /// Searches shows by free text and resolves the hits into full records
    ///
    /// One rate-limited search call yields stub ids, which then fan out
    /// through [`Self::get_shows`]. A failed search reports and returns an
    /// empty batch.
    pub async fn search_shows(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Vec<Option<Show>> {
        let stubs = match self
            .limiter
            .call(self.source.search_shows(query, language, page))
            .await
        {
            Ok(stubs) => stubs,
            Err(e) => {
                self.report_failure("SearchShows", &e);
                return Vec::new();
            }
        };

        let ids: Vec<u32> = stubs.iter().map(|stub| stub.id).collect();
        self.get_shows(&ids, language).await
    }

    /// Fetches a listing endpoint and resolves every stub into a full show
    ///
    /// With `PageSpec::Page(n)` exactly that page is fetched; with
    /// `PageSpec::All` up to `max_pages` pages are fetched concurrently,
    /// each independently rate-limited. The result is preallocated at
    /// `pages * results_per_page` slots and each show lands at absolute
    /// offset `page_slot * results_per_page + within_page_index`: page slot
    /// 0 owns `[0, results_per_page)`, slot 1 owns the next block, and so
    /// on, regardless of completion order. Short or failed pages leave their
    /// remaining slots `None`.
    pub async fn list_complete(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        language: &str,
        page: PageSpec,
    ) -> Vec<Option<Show>> {
        let pages: Vec<u32> = match page {
            PageSpec::Page(p) => vec![p],
            PageSpec::All => (0..self.max_pages as u32).collect(),
        };
        let per_page = self.results_per_page;

        let page_fetches = pages.iter().enumerate().map(|(slot, &page_index)| {
            let start_index = slot * per_page;
            async move {
                let stubs = match self
                    .limiter
                    .call(self.source.fetch_listing_page(endpoint, params, page_index))
                    .await
                {
                    Ok(stubs) => stubs,
                    Err(e) => {
                        self.report_failure("ListShows", &e);
                        return (start_index, Vec::new());
                    }
                };

                let ids: Vec<u32> = stubs.iter().take(per_page).map(|stub| stub.id).collect();
                (start_index, self.get_shows(&ids, language).await)
            }
        });

        let mut results: Vec<Option<Show>> = vec![None; pages.len() * per_page];
        for (start_index, shows) in futures::future::join_all(page_fetches).await {
            for (offset, show) in shows.into_iter().enumerate() {
                results[start_index + offset] = show;
            }
        }
        results
    }

    /// Shows sorted by popularity, optionally restricted to a genre id
    pub async fn popular_shows(
        &self,
        genre: Option<&str>,
        language: &str,
        page: PageSpec,
    ) -> Vec<Option<Show>> {
        let mut params = vec![
            ("language".to_string(), language.to_string()),
            ("sort_by".to_string(), "popularity.desc".to_string()),
            ("first_air_date.lte".to_string(), today()),
        ];
        if let Some(genre) = genre {
            params.push(("with_genres".to_string(), genre.to_string()));
        }
        self.list_complete("discover/tv", &params, language, page).await
    }

    /// Shows sorted by first air date, newest first
    pub async fn recent_shows(
        &self,
        genre: Option<&str>,
        language: &str,
        page: PageSpec,
    ) -> Vec<Option<Show>> {
        let mut params = vec![
            ("language".to_string(), language.to_string()),
            ("sort_by".to_string(), "first_air_date.desc".to_string()),
            ("first_air_date.lte".to_string(), today()),
        ];
        if let Some(genre) = genre {
            params.push(("with_genres".to_string(), genre.to_string()));
        }
        self.list_complete("discover/tv", &params, language, page).await
    }

    /// Shows that aired an episode within the last three days
    pub async fn recent_episodes(
        &self,
        genre: Option<&str>,
        language: &str,
        page: PageSpec,
    ) -> Vec<Option<Show>> {
        let three_days_ago = (Utc::now() - chrono::Duration::days(3))
            .format("%Y-%m-%d")
            .to_string();
        let mut params = vec![
            ("language".to_string(), language.to_string()),
            ("air_date.gte".to_string(), three_days_ago),
            ("first_air_date.lte".to_string(), today()),
        ];
        if let Some(genre) = genre {
            params.push(("with_genres".to_string(), genre.to_string()));
        }
        self.list_complete("discover/tv", &params, language, page).await
    }

    /// TMDB's curated top-rated show listing
    pub async fn top_rated_shows(&self, language: &str, page: PageSpec) -> Vec<Option<Show>> {
        let params = vec![("language".to_string(), language.to_string())];
        self.list_complete("tv/top_rated", &params, language, page).await
    }

    /// Shows sorted by vote count, optionally restricted to a genre id
    pub async fn most_voted_shows(
        &self,
        genre: Option<&str>,
        language: &str,
        page: PageSpec,
    ) -> Vec<Option<Show>> {
        let mut params = vec![
            ("language".to_string(), language.to_string()),
            ("sort_by".to_string(), "vote_count.desc".to_string()),
            ("first_air_date.lte".to_string(), today()),
        ];
        if let Some(genre) = genre {
            params.push(("with_genres".to_string(), genre.to_string()));
        }
        self.list_complete("discover/tv", &params, language, page).await
    }

    /// Fetches the TV genre list; a failure reports and yields no genres
    pub async fn tv_genres(&self, language: &str) -> Vec<Genre> {
        match self.limiter.call(self.source.fetch_genres(language)).await {
            Ok(genres) => genres,
            Err(e) => {
                self.report_failure("GetTVGenres", &e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CapturingReporter;
    use crate::tmdb::models::{Popularity, ShowStub};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Scripted source: shows are generated from their id, listed ids fail
    /// on demand, and every remote call is counted.
    #[derive(Default)]
    struct FakeSource {
        show_calls: AtomicUsize,
        listing_calls: AtomicUsize,
        failing_ids: HashSet<u32>,
        failing_pages: HashSet<u32>,
        /// Stubs returned per 0-based listing/search page
        page_stubs: Vec<Vec<u32>>,
    }

    impl FakeSource {
        fn stubs(ids: &[u32]) -> Vec<ShowStub> {
            ids.iter()
                .map(|&id| ShowStub {
                    id,
                    name: format!("Show {}", id),
                    first_air_date: "2020-01-01".to_string(),
                })
                .collect()
        }

        fn show(id: u32, language: &str) -> Show {
            Show {
                id,
                name: format!("Show {} ({})", id, language),
                popularity: Popularity(id as f64),
                ..sparse_show(id)
            }
        }
    }

    fn sparse_show(id: u32) -> Show {
        serde_json::from_str(&format!(r#"{{"id": {}}}"#, id)).expect("sparse show parses")
    }

    #[async_trait]
    impl ShowSource for FakeSource {
        async fn fetch_show(&self, id: u32, language: &str) -> Result<Show, TmdbError> {
            self.show_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_ids.contains(&id) {
                return Err(TmdbError::BadStatus(500));
            }
            Ok(Self::show(id, language))
        }

        async fn search_shows(
            &self,
            _query: &str,
            _language: &str,
            page: u32,
        ) -> Result<Vec<ShowStub>, TmdbError> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_pages.contains(&page) {
                return Err(TmdbError::BadStatus(503));
            }
            let ids = self.page_stubs.get(page as usize).cloned().unwrap_or_default();
            Ok(Self::stubs(&ids))
        }

        async fn fetch_genres(&self, _language: &str) -> Result<Vec<Genre>, TmdbError> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_pages.contains(&0) {
                return Err(TmdbError::BadStatus(500));
            }
            Ok(vec![
                Genre { id: 18, name: "Drama".to_string() },
                Genre { id: 35, name: "Comedy".to_string() },
            ])
        }

        async fn fetch_listing_page(
            &self,
            _endpoint: &str,
            _params: &[(String, String)],
            page: u32,
        ) -> Result<Vec<ShowStub>, TmdbError> {
            self.listing_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_pages.contains(&page) {
                return Err(TmdbError::BadStatus(503));
            }
            let ids = self.page_stubs.get(page as usize).cloned().unwrap_or_default();
            Ok(Self::stubs(&ids))
        }
    }

    struct Harness {
        fetcher: ShowFetcher,
        source: Arc<FakeSource>,
        reporter: Arc<CapturingReporter>,
        _temp_dir: TempDir,
    }

    fn harness(source: FakeSource, config: Config) -> Harness {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheStore::with_dir(temp_dir.path().to_path_buf());
        let source = Arc::new(source);
        let reporter = Arc::new(CapturingReporter::default());
        let fetcher = ShowFetcher::new(
            Arc::clone(&source) as Arc<dyn ShowSource>,
            cache,
            RateLimiter::unlimited(),
            Arc::clone(&reporter) as Arc<dyn Reporter>,
            &config,
        );
        Harness { fetcher, source, reporter, _temp_dir: temp_dir }
    }

    fn small_config() -> Config {
        Config {
            results_per_page: 4,
            max_pages: 3,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_show_cache_hit_skips_remote_call() {
        let h = harness(FakeSource::default(), small_config());

        let first = h.fetcher.get_show(1396, "en").await.expect("First fetch succeeds");
        let second = h.fetcher.get_show(1396, "en").await.expect("Second fetch succeeds");

        assert_eq!(first, second, "Cached value must equal the fetched one");
        assert_eq!(
            h.source.show_calls.load(Ordering::SeqCst),
            1,
            "Second fetch within the TTL must not hit the remote"
        );
    }

    #[tokio::test]
    async fn test_get_show_refetches_after_expiry() {
        let config = Config { cache_ttl_hours: 0, ..small_config() };
        let h = harness(FakeSource::default(), config);

        h.fetcher.get_show(1396, "en").await.expect("First fetch succeeds");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        h.fetcher.get_show(1396, "en").await.expect("Refetch succeeds");

        assert_eq!(
            h.source.show_calls.load(Ordering::SeqCst),
            2,
            "An expired entry must trigger a new remote call"
        );
    }

    #[tokio::test]
    async fn test_cache_entries_are_per_language() {
        let h = harness(FakeSource::default(), small_config());

        let en = h.fetcher.get_show(1396, "en").await.expect("en fetch succeeds");
        let de = h.fetcher.get_show(1396, "de").await.expect("de fetch succeeds");

        assert_ne!(en.name, de.name);
        assert_eq!(h.source.show_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_returns_none_and_notifies() {
        let source = FakeSource {
            failing_ids: HashSet::from([7]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        assert!(h.fetcher.get_show(7, "en").await.is_none());

        let messages = h.reporter.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "GetShow bad status: 500");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = FakeSource {
            failing_ids: HashSet::from([7]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        assert!(h.fetcher.get_show(7, "en").await.is_none());
        assert!(h.fetcher.get_show(7, "en").await.is_none());

        assert_eq!(
            h.source.show_calls.load(Ordering::SeqCst),
            2,
            "Failures are terminal per request, never cached"
        );
    }

    #[tokio::test]
    async fn test_get_shows_preserves_order_with_partial_failure() {
        let source = FakeSource {
            failing_ids: HashSet::from([2]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h.fetcher.get_shows(&[1, 2, 3], "en").await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().map(|s| s.id), Some(1));
        assert!(results[1].is_none(), "Failed id leaves only its own slot empty");
        assert_eq!(results[2].as_ref().map(|s| s.id), Some(3));
    }

    #[tokio::test]
    async fn test_search_resolves_stubs_into_full_shows() {
        let source = FakeSource {
            page_stubs: vec![vec![10, 11]],
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h.fetcher.search_shows("breaking", "en", 0).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().map(|s| s.id), Some(10));
        assert_eq!(results[1].as_ref().map(|s| s.id), Some(11));
        assert_eq!(h.source.show_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_search_returns_empty_and_notifies() {
        let source = FakeSource {
            failing_pages: HashSet::from([0]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h.fetcher.search_shows("breaking", "en", 0).await;

        assert!(results.is_empty());
        assert_eq!(h.reporter.messages(), vec!["SearchShows bad status: 503"]);
    }

    #[tokio::test]
    async fn test_list_complete_single_page_occupies_first_block() {
        let source = FakeSource {
            page_stubs: vec![vec![], vec![], vec![20, 21, 22]],
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h
            .fetcher
            .list_complete("tv/top_rated", &[], "en", PageSpec::Page(2))
            .await;

        // A single requested page lands in slots [0, results_per_page)
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().map(|s| s.id), Some(20));
        assert_eq!(results[2].as_ref().map(|s| s.id), Some(22));
        assert!(results[3].is_none(), "Short page leaves trailing slots empty");
        assert_eq!(h.source.listing_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_complete_all_pages_places_results_at_absolute_offsets() {
        let source = FakeSource {
            page_stubs: vec![
                vec![100, 101, 102, 103],
                vec![200, 201, 202, 203],
                vec![300, 301],
            ],
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h
            .fetcher
            .list_complete("discover/tv", &[], "en", PageSpec::All)
            .await;

        assert_eq!(results.len(), 12, "3 pages x 4 results per page");
        // Page 0 occupies [0, 4)
        assert_eq!(results[0].as_ref().map(|s| s.id), Some(100));
        assert_eq!(results[3].as_ref().map(|s| s.id), Some(103));
        // Page 1 occupies [4, 8)
        assert_eq!(results[4].as_ref().map(|s| s.id), Some(200));
        assert_eq!(results[7].as_ref().map(|s| s.id), Some(203));
        // Page 2 only produced two results
        assert_eq!(results[8].as_ref().map(|s| s.id), Some(300));
        assert_eq!(results[9].as_ref().map(|s| s.id), Some(301));
        assert!(results[10].is_none());
        assert!(results[11].is_none());
    }

    #[tokio::test]
    async fn test_list_complete_failed_page_spares_siblings() {
        let source = FakeSource {
            page_stubs: vec![
                vec![100, 101, 102, 103],
                vec![200, 201, 202, 203],
                vec![300, 301, 302, 303],
            ],
            failing_pages: HashSet::from([1]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h
            .fetcher
            .list_complete("discover/tv", &[], "en", PageSpec::All)
            .await;

        assert_eq!(results[0].as_ref().map(|s| s.id), Some(100));
        assert!(results[4..8].iter().all(Option::is_none), "Dead page empties its own block");
        assert_eq!(results[8].as_ref().map(|s| s.id), Some(300));
        // The failed page is notified like any other endpoint
        assert_eq!(h.reporter.messages(), vec!["ListShows bad status: 503"]);
    }

    #[tokio::test]
    async fn test_list_complete_ignores_excess_stubs() {
        let source = FakeSource {
            page_stubs: vec![vec![1, 2, 3, 4, 5, 6]],
            ..Default::default()
        };
        let h = harness(source, small_config());

        let results = h
            .fetcher
            .list_complete("discover/tv", &[], "en", PageSpec::Page(0))
            .await;

        // An overfull remote page cannot spill into a sibling's block
        assert_eq!(results.len(), 4);
        assert_eq!(results[3].as_ref().map(|s| s.id), Some(4));
    }

    #[tokio::test]
    async fn test_tv_genres_failure_yields_empty_list() {
        let source = FakeSource {
            failing_pages: HashSet::from([0]),
            ..Default::default()
        };
        let h = harness(source, small_config());

        let genres = h.fetcher.tv_genres("en").await;

        assert!(genres.is_empty());
        assert_eq!(h.reporter.messages(), vec!["GetTVGenres bad status: 500"]);
    }

    #[tokio::test]
    async fn test_tv_genres_success() {
        let h = harness(FakeSource::default(), small_config());
        let genres = h.fetcher.tv_genres("en").await;
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name, "Drama");
    }

    #[test]
    fn test_show_cache_key_format() {
        assert_eq!(show_cache_key(1396, "en"), "com.tmdb.show.1396.en");
    }
}
