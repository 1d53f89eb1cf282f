//! Shard Module
//!
//! One independent partition of the cache: a ring buffer, an index mapping
//! `hash(key)` to a packed `(position, meta flag)` value, and one
//! read/write lock. Expiry is enforced lazily when an entry is read; a
//! stale index entry whose ring position was overwritten is detected on
//! lookup and treated as a miss.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::cache::clock::StoppableClock;
use crate::cache::codec;
use crate::cache::pool::BlockPool;
use crate::cache::ring::RingBuf;
use crate::cache::stats::CacheStats;
use crate::cache::{DEFAULT_KEY_SIZE, DEFAULT_VALUE_SIZE, ENTRY_HEADERS_SIZE, ENTRY_INDEX_BITS};
use crate::error::{CacheError, Result};

// == Shard ==
pub(crate) struct Shard {
    inner: RwLock<ShardInner>,

    ttl_seconds: i64,
    stats_enabled: bool,
    clock: Arc<dyn StoppableClock>,

    // counters are read with relaxed loads by load_stats
    hits: AtomicU64,
    misses: AtomicU64,
    del_hits: AtomicU64,
    del_misses: AtomicU64,
    collisions: AtomicU64,
}

/// State guarded by the shard lock.
struct ShardInner {
    ring: RingBuf,
    /// Maps `hash(key)` to the record's ring position packed together with
    /// the fragmented-entry flag in the high bit.
    entries: FxHashMap<u64, u64>,
}

impl Shard {
    /// Creates a shard with a `shard_bytes` arena budget, rounded up to
    /// whole blocks.
    pub(crate) fn new(
        shard_bytes: u64,
        block_size: u64,
        ttl_seconds: i64,
        max_shard_bytes: u64,
        clock: Arc<dyn StoppableClock>,
        pool: Arc<BlockPool>,
        stats_enabled: bool,
    ) -> Result<Self> {
        if shard_bytes == 0 {
            return Err(CacheError::ZeroBytesShardSize);
        }

        if shard_bytes >= max_shard_bytes {
            return Err(CacheError::InvalidConfig(format!(
                "shard size {} should be smaller than max shard size {}",
                shard_bytes, max_shard_bytes
            )));
        }

        let blocks = (shard_bytes + block_size - 1) / block_size;

        Ok(Self {
            inner: RwLock::new(ShardInner {
                ring: RingBuf::new(blocks, block_size, pool),
                entries: FxHashMap::default(),
            }),
            ttl_seconds,
            stats_enabled,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            del_hits: AtomicU64::new(0),
            del_misses: AtomicU64::new(0),
            collisions: AtomicU64::new(0),
        })
    }

    // == Set ==
    /// Appends `header ‖ key ‖ value` to the ring and points the index at it.
    ///
    /// An existing entry under the same hash is replaced; its old record
    /// becomes garbage to be overwritten by ring progress.
    pub(crate) fn set(&self, key: &[u8], value: &[u8], hashed_key: u64, is_meta: bool) -> Result<()> {
        if key.len() >= DEFAULT_KEY_SIZE {
            return Err(CacheError::EntryKeyTooBig);
        }

        if value.len() >= DEFAULT_VALUE_SIZE {
            return Err(CacheError::EntryValueTooBig);
        }

        let mut inner = self.inner.write();

        let header = codec::encode_entry_header(self.clock.now(), key.len(), value.len());
        let record_len = (ENTRY_HEADERS_SIZE + key.len() + value.len()) as u64;
        if record_len >= inner.ring.block_size() {
            return Err(CacheError::EntryTooBig);
        }

        let position = inner.ring.write(&[&header, key, value]);
        inner
            .entries
            .insert(hashed_key, codec::pack_integers(position, is_meta as u64, ENTRY_INDEX_BITS));

        Ok(())
    }

    // == Get ==
    /// Looks up `hashed_key` and, on an exact key match, appends the value
    /// bytes to `ret_buf` when `append_to_buf` is set.
    ///
    /// Returns the entry's fragmented-entry flag. A hash match whose stored
    /// key differs from `key` is a collision: the call succeeds without
    /// appending anything. Expired entries are removed here, under the
    /// exclusive lock, and reported as [`CacheError::NotFound`].
    pub(crate) fn get(
        &self,
        ret_buf: &mut Vec<u8>,
        key: &[u8],
        hashed_key: u64,
        append_to_buf: bool,
    ) -> Result<bool> {
        let inner = self.inner.read();

        let packed = match inner.entries.get(&hashed_key) {
            Some(&packed) => packed,
            None => {
                drop(inner);
                self.record_miss();
                return Err(CacheError::NotFound);
            }
        };

        let (position, meta_bit) = codec::unpack_integers(packed, ENTRY_INDEX_BITS);
        let is_meta = meta_bit == 1;

        let block_size = inner.ring.block_size();
        let block_idx = position / block_size;
        if block_idx >= inner.ring.len() {
            warn!(
                block_idx,
                blocks = inner.ring.len(),
                "corrupted index, block index points past the ring"
            );
            drop(inner);
            self.record_miss();
            return Err(CacheError::NotFound);
        }

        let mut offset = position % block_size;
        if offset + ENTRY_HEADERS_SIZE as u64 >= block_size {
            warn!(offset, block_size, "corrupted index, entry headers exceed the block");
            drop(inner);
            self.record_miss();
            return Err(CacheError::NotFound);
        }

        let Some(header) = inner.ring.read(block_idx, offset, offset + ENTRY_HEADERS_SIZE as u64) else {
            warn!(block_idx, offset, "corrupted index, entry headers past the block's length");
            drop(inner);
            self.record_miss();
            return Err(CacheError::NotFound);
        };
        let (timestamp, key_len, value_len) = codec::decode_entry_header(header);

        // Evict on get. The shared lock is dropped before the exclusive one
        // is requested; the index entry is removed only if it still holds
        // the packed value observed above.
        if self.clock.now().wrapping_sub(timestamp) > self.ttl_seconds {
            drop(inner);

            let mut inner = self.inner.write();
            if inner.entries.get(&hashed_key) == Some(&packed) {
                inner.entries.remove(&hashed_key);
            }
            drop(inner);

            self.record_miss();
            return Err(CacheError::NotFound);
        }

        offset += ENTRY_HEADERS_SIZE as u64;
        if offset + key_len + value_len >= block_size {
            warn!(
                key_len,
                value_len, offset, block_size, "corrupted index, entry payload exceeds the block"
            );
            drop(inner);
            self.record_miss();
            return Err(CacheError::NotFound);
        }

        let Some(stored_key) = inner.ring.read(block_idx, offset, offset + key_len) else {
            warn!(block_idx, offset, "corrupted index, entry key past the block's length");
            drop(inner);
            self.record_miss();
            return Err(CacheError::NotFound);
        };

        if stored_key != key {
            // hash matched but the key bytes differ, the caller observes an
            // empty value
            drop(inner);
            self.record_collision();
            return Ok(is_meta);
        }

        offset += key_len;
        if append_to_buf {
            let Some(value) = inner.ring.read(block_idx, offset, offset + value_len) else {
                warn!(block_idx, offset, "corrupted index, entry value past the block's length");
                drop(inner);
                self.record_miss();
                return Err(CacheError::NotFound);
            };
            ret_buf.extend_from_slice(value);
        }

        drop(inner);
        self.record_hit();

        Ok(is_meta)
    }

    // == Delete ==
    /// Removes the index entry for `hashed_key`. The record's payload bytes
    /// stay in the ring until overwritten by a wrap.
    pub(crate) fn del(&self, hashed_key: u64) -> Result<()> {
        self.record_del_hit();

        let mut inner = self.inner.write();
        if inner.entries.remove(&hashed_key).is_none() {
            drop(inner);
            self.record_del_miss();
            return Err(CacheError::NotFound);
        }

        Ok(())
    }

    // == Reset ==
    /// Empties the ring and the index and zeroes all counters.
    pub(crate) fn reset(&self) {
        let mut inner = self.inner.write();

        inner.ring.reset();
        inner.entries.clear();

        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.del_hits.store(0, Ordering::Relaxed);
        self.del_misses.store(0, Ordering::Relaxed);
        self.collisions.store(0, Ordering::Relaxed);
    }

    // == Length ==
    pub(crate) fn len(&self) -> u64 {
        self.inner.read().entries.len() as u64
    }

    // == Load Stats ==
    /// Adds this shard's counters, entry count and arena bytes to `stats`.
    pub(crate) fn load_stats(&self, stats: &mut CacheStats) {
        stats.hits += self.hits.load(Ordering::Relaxed);
        stats.misses += self.misses.load(Ordering::Relaxed);
        stats.del_hits += self.del_hits.load(Ordering::Relaxed);
        stats.del_misses += self.del_misses.load(Ordering::Relaxed);
        stats.collisions += self.collisions.load(Ordering::Relaxed);

        let inner = self.inner.read();
        stats.entries_count += inner.entries.len() as u64;
        stats.cache_bytes += inner.ring.cap();
    }

    fn record_hit(&self) {
        if self.stats_enabled {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_miss(&self) {
        if self.stats_enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_del_hit(&self) {
        if self.stats_enabled {
            self.del_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_del_miss(&self) {
        if self.stats_enabled {
            self.del_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_collision(&self) {
        if self.stats_enabled {
            self.collisions.fetch_add(1, Ordering::Relaxed);
        }
    }
}
