//! Cache module for storing TMDB API responses to disk
//!
//! Provides a keyed, TTL-based store that persists serialized API responses
//! to the filesystem. Expiry is soft: nothing is evicted in the background,
//! a read simply treats an entry past its expiry timestamp as absent.
//! Corrupt or unreadable entries also degrade to a miss so a damaged cache
//! can never fail a fetch.

mod store;

pub use store::CacheStore;
