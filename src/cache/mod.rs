//! Cache Module
//!
//! Sharded in-memory byte cache backed by a ring of fixed-size memory blocks,
//! with a global TTL enforced lazily on the read path.

mod clock;
mod codec;
mod hash;
mod options;
mod pool;
mod ring;
mod shard;
mod stats;
mod store;


// Re-export public types
pub use clock::{CachedClock, Clock, StoppableClock};
pub use hash::{Hasher, Xxh3Hasher};
pub use options::CacheOptions;
pub use pool::BlockPool;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Size of the per-entry header: timestamp (8) + key length (2) + value length (2).
pub const ENTRY_HEADERS_SIZE: usize = 12;

/// Keys at or above this size are rejected by the storage layer.
pub const DEFAULT_KEY_SIZE: usize = 16 * 1024;

/// Values at or above this size are rejected by the storage layer; larger
/// values are split into fragments before they reach it.
pub const DEFAULT_VALUE_SIZE: usize = 48 * 1024 - ENTRY_HEADERS_SIZE;

/// Size of one memory block in the ring arena.
pub const DEFAULT_BLOCK_SIZE: u64 = 64 * 1024;

/// Exclusive upper bound for a single shard's byte budget.
pub const MAX_SHARD_SIZE: u64 = 1024 * 1024 * 1024;

/// Number of low bits carrying the ring position in a packed index value;
/// the remaining high bit carries the fragmented-entry flag.
pub const ENTRY_INDEX_BITS: u32 = 63;

/// Size of a fragment reference: value hash (8) + fragment index or total
/// value length (8), both big-endian.
pub const FRAGMENTED_META_SIZE: usize = 16;

/// Default total arena ceiling.
pub const DEFAULT_MAX_BYTES: usize = 32 * 1024 * 1024;

/// Default shard count; must be a power of two.
pub const DEFAULT_SHARD_COUNT: usize = 512;

/// Default time-to-live in seconds.
pub const DEFAULT_TTL_SECONDS: i64 = 30 * 60;
