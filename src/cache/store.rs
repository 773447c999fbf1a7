//! Disk-backed TTL cache for API responses
//!
//! Stores each entry as a JSON file wrapping the payload with its write and
//! expiry timestamps. Keys are dotted namespace strings such as
//! `com.tmdb.show.1396.en`, mapped directly to file names.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached payload
    data: T,
    /// When the payload was cached
    cached_at: DateTime<Utc>,
    /// When the entry stops being served
    expires_at: DateTime<Utc>,
}

/// Keyed, TTL-based persistent blob store for API responses
///
/// Entries are JSON files in an XDG-compliant cache directory
/// (`~/.cache/showfetch/` on Linux) or an explicitly chosen directory.
/// Reads apply soft expiry: an entry past its `expires_at` timestamp is
/// reported as absent without being deleted. Concurrent readers and writers
/// are safe because distinct keys map to distinct files and same-key writes
/// are whole-file replacements (last write wins).
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined
    /// (e.g. no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "showfetch")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a store rooted at a custom directory
    ///
    /// Used by tests and by hosts that manage their own profile directory.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a value under `key` with the given TTL in hours
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the entry (e.g. "com.tmdb.show.1396.en")
    /// * `data` - The value to cache (must implement Serialize)
    /// * `ttl_hours` - How long the entry stays fresh
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl_hours: u64) -> std::io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + Duration::hours(ttl_hours as i64),
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.entry_path(key), json)
    }

    /// Reads the value under `key`, applying soft expiry
    ///
    /// Returns `None` when the entry does not exist, cannot be parsed, or has
    /// passed its expiry timestamp. A parse failure is deliberately
    /// indistinguishable from a miss: the caller refetches and overwrites the
    /// damaged file.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        if Utc::now() > entry.expires_at {
            return None;
        }
        Some(entry.data)
    }
}
