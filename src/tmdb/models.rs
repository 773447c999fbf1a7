//! Wire records for the TMDB v3 API
//!
//! Serde structs for the show, listing, genre, and credits payloads this
//! crate consumes. Most fields are optional because TMDB omits or nulls
//! them freely; listing stubs carry only the handful of fields needed to
//! drive full-entity fetches.

use serde::{Deserialize, Serialize};

/// A TV show's popularity score, normalized to one numeric type
///
/// TMDB transmits this field as either a JSON number or a numeric string
/// depending on endpoint and era. The ambiguity is resolved here, at the
/// deserialization boundary: whatever arrives becomes one `f64`, and text
/// that fails to parse degrades silently to the default of `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Popularity(pub f64);

impl Default for Popularity {
    fn default() -> Self {
        Popularity(0.0)
    }
}

impl<'de> Deserialize<'de> for Popularity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(serde_json::Value),
        }

        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s.parse().unwrap_or(0.0),
            Raw::Other(_) => 0.0,
        };
        Ok(Popularity(value))
    }
}

/// A full TV show record as returned by `tv/{id}`
///
/// Cached per `(id, language)` pair. Fetched with
/// `append_to_response=credits,external_ids`, so credits and external ids
/// arrive inline when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// TMDB show id
    pub id: u32,
    /// Localized title
    #[serde(default)]
    pub name: String,
    /// Title in the show's original language
    #[serde(default)]
    pub original_name: String,
    /// Plot summary
    #[serde(default)]
    pub overview: String,
    /// First air date as `YYYY-MM-DD`
    #[serde(default)]
    pub first_air_date: String,
    /// Popularity score, normalized from string-or-number input
    #[serde(default)]
    pub popularity: Popularity,
    /// Average user rating (0-10)
    #[serde(default)]
    pub vote_average: f64,
    /// Number of votes behind the average
    #[serde(default)]
    pub vote_count: u32,
    /// Whether the show is still in production
    #[serde(default)]
    pub in_production: bool,
    /// Genres attached to the show
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Production companies
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    /// Cast and crew, present when appended to the response
    #[serde(default)]
    pub credits: Option<Credits>,
    /// Identifiers in other databases, present when appended
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    /// Poster image path fragment
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path fragment
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

/// A minimal show reference from a search or listing page
///
/// Stubs exist only to yield ids for full fetches and are discarded
/// immediately afterwards; they are never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowStub {
    /// TMDB show id
    pub id: u32,
    /// Localized title, when present
    #[serde(default)]
    pub name: String,
    /// First air date as `YYYY-MM-DD`, when present
    #[serde(default)]
    pub first_air_date: String,
}

/// One page of a paged search or discovery response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowList {
    /// 1-based page index of this response
    #[serde(default)]
    pub page: u32,
    /// Stubs on this page, in remote order
    #[serde(default)]
    pub results: Vec<ShowStub>,
    /// Total number of pages available
    #[serde(default)]
    pub total_pages: u32,
}

/// A TMDB genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    /// TMDB genre id
    pub id: u32,
    /// Display name
    pub name: String,
}

/// Response shape of `genre/tv/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenreList {
    /// All TV genres for the requested language
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// A production company attached to a show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCompany {
    /// TMDB company id
    pub id: u32,
    /// Display name
    pub name: String,
}

/// Cast and crew lists appended to a show response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    /// Cast members in billing order
    #[serde(default)]
    pub cast: Vec<CastMember>,
    /// Crew members
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// A single cast credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    /// Actor name
    pub name: String,
    /// Character played
    #[serde(default)]
    pub character: String,
}

/// A single crew credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Crew member name
    pub name: String,
    /// Job title, e.g. "Director" or "Writer"
    #[serde(default)]
    pub job: String,
}

/// Identifiers for the same show in other databases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIds {
    /// IMDB identifier, e.g. "tt0903747"
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// TheTVDB identifier
    #[serde(default)]
    pub tvdb_id: Option<u32>,
}
