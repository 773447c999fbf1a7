//! Command-line interface parsing for showfetch
//!
//! This module handles parsing of CLI arguments using clap, covering the
//! fetch subcommands and the flags that feed the pipeline [`Config`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::tmdb::PageSpec;

/// Error types for CLI argument resolution
#[derive(Debug, Error)]
pub enum CliError {
    /// No API key on the command line or in the environment
    #[error("No TMDB API key. Pass --api-key or set the TMDB_API_KEY environment variable.")]
    MissingApiKey,
}

/// Showfetch - fetch TV show metadata from TMDB
#[derive(Parser, Debug)]
#[command(name = "showfetch")]
#[command(about = "Fetch TV show metadata from TMDB with disk caching and rate limiting")]
#[command(version)]
pub struct Cli {
    /// TMDB API key; falls back to the TMDB_API_KEY environment variable
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Metadata language as an ISO 639-1 code
    #[arg(long, global = true, default_value = "en")]
    pub language: String,

    /// Cache directory override (defaults to the XDG cache dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Fetch operations exposed by the binary
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one show by TMDB id
    Show {
        /// TMDB show id
        id: u32,
    },
    /// Search shows by title and resolve the hits into full records
    Search {
        /// Free-text query
        query: String,
        /// 0-based result page
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// List shows sorted by popularity
    Popular(ListingArgs),
    /// List shows sorted by first air date
    Recent(ListingArgs),
    /// List shows that aired an episode in the last three days
    RecentEpisodes(ListingArgs),
    /// TMDB's curated top-rated listing
    TopRated(ListingArgs),
    /// List shows sorted by vote count
    MostVoted(ListingArgs),
    /// List the TV genres for the selected language
    Genres,
}

/// Shared flags for the listing subcommands
#[derive(Args, Debug, Default)]
pub struct ListingArgs {
    /// Restrict results to a TMDB genre id
    #[arg(long)]
    pub genre: Option<String>,

    /// Fetch exactly this 0-based page
    #[arg(long, conflicts_with = "all_pages")]
    pub page: Option<u32>,

    /// Fetch every page up to the configured maximum
    #[arg(long)]
    pub all_pages: bool,
}

impl ListingArgs {
    /// Translates the paging flags into a [`PageSpec`]
    ///
    /// `--all-pages` wins; otherwise `--page N` or the default page 0.
    pub fn page_spec(&self) -> PageSpec {
        if self.all_pages {
            PageSpec::All
        } else {
            PageSpec::Page(self.page.unwrap_or(0))
        }
    }
}

/// Builds the pipeline configuration from parsed CLI arguments
///
/// # Returns
/// * `Ok(Config)` with the resolved API key and overrides applied
/// * `Err(CliError::MissingApiKey)` when no key is available
pub fn resolve_config(cli: &Cli) -> Result<Config, CliError> {
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("TMDB_API_KEY").ok())
        .filter(|key| !key.is_empty())
        .ok_or(CliError::MissingApiKey)?;

    let mut config = Config::with_api_key(api_key);
    config.language = cli.language.clone();
    config.cache_dir = cli.cache_dir.clone();
    Ok(config)
}
