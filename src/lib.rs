//! Showfetch Library
//!
//! A rate-limited, cache-backed TMDB metadata client. The modules are the
//! pipeline's layers: a TTL disk cache, a windowed rate limiter, the TMDB
//! wire client, and the orchestrator that composes them with graceful
//! degradation on failure.

pub mod cache;
pub mod cli;
pub mod config;
pub mod limiter;
pub mod report;
pub mod tmdb;
