//! Cache Statistics Module
//!
//! Monotonic counters aggregated across shards. Shards add into an
//! existing struct so a single snapshot can sum the whole cache.

use serde::Serialize;

// == Cache Stats ==
/// Aggregated cache counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successfully found keys.
    pub hits: u64,
    /// Number of not found keys.
    pub misses: u64,
    /// Number of delete attempts.
    #[serde(rename = "delete_hits")]
    pub del_hits: u64,
    /// Number of deletes that found nothing to remove.
    #[serde(rename = "delete_misses")]
    pub del_misses: u64,
    /// Number of key collisions observed on the read path.
    pub collisions: u64,
    /// Current number of entries in the cache.
    pub entries_count: u64,
    /// Current size of the cache arena in bytes.
    pub cache_bytes: u64,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache hit rate: hits / (hits + misses), or 0.0 before any reads.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
