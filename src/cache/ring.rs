//! Ring Buffer Module
//!
//! A fixed number of fixed-size memory blocks plus a monotonically advancing
//! write cursor. Records are appended as a single contiguous run of slices
//! and never straddle two blocks; when the arena is exhausted the cursor
//! wraps and the oldest block is overwritten.
//!
//! The ring is not internally synchronised; the enclosing shard provides
//! exclusion.

use std::sync::Arc;

use crate::cache::pool::BlockPool;

// == Ring Buffer ==
#[derive(Debug)]
pub(crate) struct RingBuf {
    /// Backing blocks; `None` until first written after construction or reset.
    blocks: Vec<Option<Vec<u8>>>,
    block_size: u64,
    /// Bytes written since the last reset; the next record starts here.
    write_cursor: u64,
    pool: Arc<BlockPool>,
}

impl RingBuf {
    pub(crate) fn new(blocks: u64, block_size: u64, pool: Arc<BlockPool>) -> Self {
        Self {
            blocks: (0..blocks).map(|_| None).collect(),
            block_size,
            write_cursor: 0,
            pool,
        }
    }

    /// Appends `slices` as one contiguous record and returns its byte position.
    ///
    /// A record that would cross into the next block is moved wholesale to
    /// that block's start; a record that would run past the final block wraps
    /// to block 0. In both cases the target block is truncated first, which
    /// invalidates whatever records lived there.
    pub(crate) fn write(&mut self, slices: &[&[u8]]) -> u64 {
        let record_len: u64 = slices.iter().map(|s| s.len() as u64).sum();

        let mut from = self.write_cursor;
        let mut to = from + record_len;
        let mut block_idx = from / self.block_size;
        let next_block_idx = to / self.block_size;

        if next_block_idx > block_idx {
            if next_block_idx >= self.len() {
                from = 0;
                to = record_len;
                block_idx = 0;
            } else {
                from = next_block_idx * self.block_size;
                to = from + record_len;
                block_idx = next_block_idx;
            }

            // truncate the target block, overwriting any prior content
            if let Some(block) = &mut self.blocks[block_idx as usize] {
                block.clear();
            }
        }

        let pool = &self.pool;
        let block = self.blocks[block_idx as usize].get_or_insert_with(|| pool.acquire());
        for slice in slices {
            block.extend_from_slice(slice);
        }

        self.write_cursor = to;

        from
    }

    /// Borrows `block[block_idx][lo..hi]`.
    ///
    /// Returns `None` when the block is not materialised or the range runs
    /// past its current length, which happens for index positions
    /// invalidated by a ring wrap.
    pub(crate) fn read(&self, block_idx: u64, lo: u64, hi: u64) -> Option<&[u8]> {
        let block = self.blocks.get(block_idx as usize)?.as_ref()?;
        block.get(lo as usize..hi as usize)
    }

    /// Releases every block back to the pool and rewinds the cursor.
    pub(crate) fn reset(&mut self) {
        let pool = &self.pool;
        for slot in &mut self.blocks {
            if let Some(block) = slot.take() {
                pool.release(block);
            }
        }

        self.write_cursor = 0;
    }

    pub(crate) fn position(&self) -> u64 {
        self.write_cursor
    }

    /// Number of blocks in the ring.
    pub(crate) fn len(&self) -> u64 {
        self.blocks.len() as u64
    }

    pub(crate) fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Sum of the backing capacities of all materialised blocks.
    pub(crate) fn cap(&self) -> u64 {
        self.blocks
            .iter()
            .flatten()
            .map(|block| block.capacity() as u64)
            .sum()
    }
}
