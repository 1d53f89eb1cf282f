//! Cache Store Module
//!
//! The sharded cache: routes every operation to `shards[hash(key) & mask]`
//! and splits values larger than the block payload limit into fragments
//! stored under synthetic keys, with the user's key pointing at a metadata
//! record.

use std::sync::Arc;

use tracing::debug;

use crate::cache::clock::{CachedClock, StoppableClock};
use crate::cache::codec;
use crate::cache::hash::{Hasher, Xxh3Hasher};
use crate::cache::options::CacheOptions;
use crate::cache::pool::BlockPool;
use crate::cache::shard::Shard;
use crate::cache::stats::CacheStats;
use crate::cache::{DEFAULT_BLOCK_SIZE, DEFAULT_KEY_SIZE, DEFAULT_VALUE_SIZE, MAX_SHARD_SIZE};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Sharded in-memory byte cache with a global TTL.
///
/// All operations take `&self`; each shard carries its own lock, so readers
/// and writers of different shards never contend.
pub struct CacheStore {
    shards: Vec<Shard>,
    shard_mask: u64,

    hasher: Arc<dyn Hasher>,
    clock: Arc<dyn StoppableClock>,

    max_key_size: usize,
    max_value_size: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Builds the shards and starts the cached clock.
    ///
    /// Fails when `shards` is not a power of two or a shard's byte budget is
    /// out of range.
    pub fn new(options: CacheOptions) -> Result<Self> {
        if options.shards == 0 || !options.shards.is_power_of_two() {
            return Err(CacheError::InvalidConfig(format!(
                "shard count must be a power of two, got {}",
                options.shards
            )));
        }

        let hasher = options.hasher.unwrap_or_else(|| Arc::new(Xxh3Hasher));
        let clock = options
            .clock
            .unwrap_or_else(|| Arc::new(CachedClock::start()) as Arc<dyn StoppableClock>);

        let pool = Arc::new(BlockPool::new(DEFAULT_BLOCK_SIZE as usize));
        let shard_bytes = ((options.max_bytes + options.shards - 1) / options.shards) as u64;

        let mut shards = Vec::with_capacity(options.shards);
        for _ in 0..options.shards {
            let shard = Shard::new(
                shard_bytes,
                DEFAULT_BLOCK_SIZE,
                options.ttl_seconds,
                MAX_SHARD_SIZE,
                Arc::clone(&clock),
                Arc::clone(&pool),
                options.stats_enabled,
            );

            match shard {
                Ok(shard) => shards.push(shard),
                Err(err) => {
                    clock.stop();
                    return Err(err);
                }
            }
        }

        Ok(Self {
            shard_mask: (options.shards - 1) as u64,
            shards,
            hasher,
            clock,
            max_key_size: options.max_key_size,
            max_value_size: options.max_value_size,
        })
    }

    // == Set ==
    /// Stores `value` under `key`, fragmenting values above the block
    /// payload limit.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if value.len() > DEFAULT_VALUE_SIZE {
            return self.set_fragmented(key, value);
        }

        self.set_bin(key, value, false)
    }

    // == Get ==
    /// Retrieves the value for `key` into a fresh buffer.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.get_buf(&mut buf, key)?;
        Ok(buf)
    }

    /// Appends the value for `key` to `ret_buf`, reassembling fragmented
    /// values. On any error `ret_buf` is left exactly as it was; partial
    /// fragment data is never exposed.
    pub fn get_buf(&self, ret_buf: &mut Vec<u8>, key: &[u8]) -> Result<()> {
        let base = ret_buf.len();

        let is_meta = match self.get_bin(ret_buf, key) {
            Ok(is_meta) => is_meta,
            Err(err) => {
                ret_buf.truncate(base);
                return Err(err);
            }
        };

        if !is_meta {
            return Ok(());
        }

        // the appended bytes are fragment metadata, not the value
        let metadata = ret_buf.split_off(base);
        match self.get_fragmented(ret_buf, &metadata) {
            Ok(()) => Ok(()),
            Err(err) => {
                ret_buf.truncate(base);
                Err(err)
            }
        }
    }

    // == Delete ==
    /// Removes the index entry for `key`; payload bytes are reclaimed by
    /// ring progress, not here.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let hashed_key = self.hasher.hash(key);
        self.shard(hashed_key).del(hashed_key)
    }

    // == Reset ==
    /// Empties every shard. The clock keeps running.
    pub fn reset(&self) {
        for shard in &self.shards {
            shard.reset();
        }
    }

    // == Close ==
    /// Stops the cached clock. Operations after close are undefined.
    pub fn close(&self) {
        self.clock.stop();
    }

    // == Length ==
    /// Current number of entries across all shards.
    pub fn len(&self) -> u64 {
        self.shards.iter().map(Shard::len).sum()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Adds every shard's counters to `stats`.
    pub fn load_stats(&self, stats: &mut CacheStats) {
        for shard in &self.shards {
            shard.load_stats(stats);
        }
    }

    /// Returns a fresh stats snapshot.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::new();
        self.load_stats(&mut stats);
        stats
    }

    /// Soft key-size cap for request validators.
    pub fn max_key_size(&self) -> usize {
        self.max_key_size
    }

    /// Soft value-size cap for request validators.
    pub fn max_value_size(&self) -> usize {
        self.max_value_size
    }

    fn shard(&self, hashed_key: u64) -> &Shard {
        &self.shards[(hashed_key & self.shard_mask) as usize]
    }

    fn set_bin(&self, key: &[u8], value: &[u8], is_meta: bool) -> Result<()> {
        let hashed_key = self.hasher.hash(key);
        self.shard(hashed_key).set(key, value, hashed_key, is_meta)
    }

    fn get_bin(&self, ret_buf: &mut Vec<u8>, key: &[u8]) -> Result<bool> {
        let hashed_key = self.hasher.hash(key);
        self.shard(hashed_key).get(ret_buf, key, hashed_key, true)
    }

    // == Fragmentation ==
    /// Splits `value` into fragments of at most `DEFAULT_VALUE_SIZE - 1`
    /// bytes, stores each under `hash(value) ‖ fragment index`, then stores
    /// `hash(value) ‖ total length` under the user's key with the meta flag
    /// set.
    fn set_fragmented(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.len() > DEFAULT_KEY_SIZE {
            return Err(CacheError::EntryKeyTooBig);
        }

        let value_hash = self.hasher.hash(value);

        for (i, fragment) in value.chunks(DEFAULT_VALUE_SIZE - 1).enumerate() {
            let fragment_key = codec::encode_fragment_ref(value_hash, i as u64);
            self.set_bin(&fragment_key, fragment, false)?;
        }

        let metadata = codec::encode_fragment_ref(value_hash, value.len() as u64);
        self.set_bin(key, &metadata, true)
    }

    /// Collects the fragments named by a 16-byte metadata record into
    /// `ret_buf` and verifies length and content hash.
    ///
    /// Fragments live in the ring like any other entry and may have been
    /// overwritten independently; tracking the bytes still missing against
    /// the recorded total length turns any gap into a hard error instead of
    /// partial data.
    fn get_fragmented(&self, ret_buf: &mut Vec<u8>, metadata: &[u8]) -> Result<()> {
        let Some((value_hash, value_len)) = codec::decode_fragment_ref(metadata) else {
            // an empty or malformed metadata record yields an empty value
            return Ok(());
        };

        let base = ret_buf.len();
        ret_buf.reserve(value_len as usize);

        let mut fragment_idx = 0u64;
        while ((ret_buf.len() - base) as u64) < value_len {
            let fragment_key = codec::encode_fragment_ref(value_hash, fragment_idx);
            fragment_idx += 1;

            let grown_from = ret_buf.len();
            match self.get_bin(ret_buf, &fragment_key) {
                Ok(_) => {}
                Err(CacheError::NotFound) => {
                    debug!(fragment_idx, "fragment of the value could not be found");
                    return Err(CacheError::FragmentMissing);
                }
                Err(err) => return Err(err),
            }

            if ret_buf.len() == grown_from {
                debug!(fragment_idx, "fragment read returned no bytes");
                return Err(CacheError::FragmentMissing);
            }
        }

        let collected = &ret_buf[base..];
        if collected.len() as u64 != value_len {
            return Err(CacheError::BadLength {
                want: value_len,
                got: collected.len() as u64,
            });
        }

        let collected_hash = self.hasher.hash(collected);
        if collected_hash != value_hash {
            return Err(CacheError::BadChecksum {
                want: value_hash,
                got: collected_hash,
            });
        }

        Ok(())
    }
}

impl Drop for CacheStore {
    fn drop(&mut self) {
        // stop is a take-once, so an explicit close beforehand is fine
        self.clock.stop();
    }
}
