//! Block Pool Module
//!
//! A free-list of fixed-size byte buffers shared by all ring buffers.
//! Rings borrow one buffer per materialised block and hand them all back
//! on reset.

use parking_lot::Mutex;

// == Block Pool ==
/// Concurrent pool of reusable byte buffers with a fixed block size.
#[derive(Debug)]
pub struct BlockPool {
    block_size: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BlockPool {
    /// Creates an empty pool handing out buffers of `block_size` capacity.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns a zero-length buffer with capacity of at least the block size,
    /// reusing a released one when available.
    pub fn acquire(&self) -> Vec<u8> {
        if let Some(buf) = self.free.lock().pop() {
            return buf;
        }

        Vec::with_capacity(self.block_size)
    }

    /// Returns a buffer to the pool. Buffers whose capacity shrank below the
    /// block size are dropped silently.
    pub fn release(&self, mut buf: Vec<u8>) {
        if self.block_size != 0 && buf.capacity() < self.block_size {
            return;
        }

        buf.clear();
        self.free.lock().push(buf);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_fresh_buffer() {
        let pool = BlockPool::new(1024);
        let buf = pool.acquire();

        assert!(buf.is_empty());
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn test_release_and_reuse() {
        let pool = BlockPool::new(64);

        let mut buf = pool.acquire();
        buf.extend_from_slice(b"leftover bytes");
        pool.release(buf);

        let reused = pool.acquire();
        assert!(reused.is_empty(), "released buffer must come back empty");
        assert!(reused.capacity() >= 64);
    }

    #[test]
    fn test_release_drops_undersized_buffer() {
        let pool = BlockPool::new(1024);
        pool.release(Vec::with_capacity(16));

        // The undersized buffer must not be handed back out.
        let buf = pool.acquire();
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn test_zero_block_size_accepts_everything() {
        let pool = BlockPool::new(0);
        pool.release(Vec::with_capacity(3));

        // a fresh buffer from this pool would have no capacity at all
        let buf = pool.acquire();
        assert!(buf.capacity() >= 3);
    }
}
