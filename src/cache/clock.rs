//! Cached Clock Module
//!
//! TTL checks run once per `get` and once per `set`; reading the system
//! clock each time is a measurable cost on those paths. [`CachedClock`]
//! samples epoch seconds once per second from a background thread and
//! serves `now()` as a single atomic load. The resulting one-second
//! granularity matches the TTL unit.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

// == Clock Traits ==
/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// A clock that owns background resources and must be stopped to release them.
pub trait StoppableClock: Clock {
    /// Stops the clock. Exactly one stop per construct; the cache calls this
    /// from `close`.
    fn stop(&self);
}

// == Cached Clock ==
/// Stores Unix time every second and returns the cached value.
pub struct CachedClock {
    epoch: Arc<AtomicI64>,
    ticker: Mutex<Option<Ticker>>,
}

struct Ticker {
    // dropping the sender wakes the thread out of its current tick
    stop_tx: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl CachedClock {
    /// Reads the current epoch seconds and starts the 1 Hz ticker thread.
    pub fn start() -> Self {
        let epoch = Arc::new(AtomicI64::new(epoch_seconds()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let tick_epoch = Arc::clone(&epoch);
        let thread = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(Duration::from_secs(1)) {
                Err(RecvTimeoutError::Timeout) => {
                    tick_epoch.store(epoch_seconds(), Ordering::Relaxed);
                }
                _ => return,
            }
        });

        Self {
            epoch,
            ticker: Mutex::new(Some(Ticker { stop_tx, thread })),
        }
    }
}

impl Clock for CachedClock {
    fn now(&self) -> i64 {
        self.epoch.load(Ordering::Relaxed)
    }
}

impl StoppableClock for CachedClock {
    fn stop(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            drop(ticker.stop_tx);
            let _ = ticker.thread.join();
        }
    }
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as i64
}

// == Test Clock ==
/// Manually advanced clock for deterministic TTL tests.
#[cfg(test)]
pub(crate) struct MockClock {
    epoch: AtomicI64,
}

#[cfg(test)]
impl MockClock {
    pub(crate) fn new(start: i64) -> Self {
        Self {
            epoch: AtomicI64::new(start),
        }
    }

    pub(crate) fn advance(&self, seconds: i64) {
        self.epoch.fetch_add(seconds, Ordering::Relaxed);
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> i64 {
        self.epoch.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
impl StoppableClock for MockClock {
    fn stop(&self) {}
}
