//! TMDB metadata pipeline
//!
//! Wire models, the HTTP client, and the fetch orchestrator that ties the
//! cache, rate limiter, and remote API together.

pub mod client;
pub mod fetcher;
pub mod models;

pub use client::{ShowSource, TmdbClient, TmdbError};
pub use fetcher::{PageSpec, ShowFetcher};
pub use models::{
    CastMember, Credits, CrewMember, ExternalIds, Genre, GenreList, Popularity, ProductionCompany,
    Show, ShowList, ShowStub,
};
