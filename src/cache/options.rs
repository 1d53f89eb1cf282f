//! Cache Options Module
//!
//! A plain configuration record consumed once by [`CacheStore::new`]
//! (validation happens there); no mutation after construction.
//!
//! [`CacheStore::new`]: crate::cache::CacheStore::new

use std::sync::Arc;

use crate::cache::clock::StoppableClock;
use crate::cache::hash::Hasher;
use crate::cache::{
    DEFAULT_KEY_SIZE, DEFAULT_MAX_BYTES, DEFAULT_SHARD_COUNT, DEFAULT_TTL_SECONDS,
    DEFAULT_VALUE_SIZE,
};

// == Cache Options ==
/// Construction parameters for a [`CacheStore`].
///
/// [`CacheStore`]: crate::cache::CacheStore
#[derive(Clone)]
pub struct CacheOptions {
    /// Total arena ceiling in bytes; each shard gets `⌈max_bytes / shards⌉`.
    pub max_bytes: usize,
    /// Number of shards, must be a power of two.
    pub shards: usize,
    /// Global time-to-live in seconds.
    pub ttl_seconds: i64,
    /// Soft key-size cap enforced by request validators.
    pub max_key_size: usize,
    /// Soft value-size cap enforced by request validators.
    pub max_value_size: usize,
    /// Whether hit/miss/delete/collision counters are maintained.
    pub stats_enabled: bool,
    /// Hash function override; XXH3 when `None`.
    pub hasher: Option<Arc<dyn Hasher>>,
    /// Clock override for tests; a [`CachedClock`] is started when `None`.
    ///
    /// [`CachedClock`]: crate::cache::CachedClock
    pub clock: Option<Arc<dyn StoppableClock>>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            shards: DEFAULT_SHARD_COUNT,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_key_size: DEFAULT_KEY_SIZE,
            max_value_size: DEFAULT_VALUE_SIZE,
            stats_enabled: true,
            hasher: None,
            clock: None,
        }
    }
}
