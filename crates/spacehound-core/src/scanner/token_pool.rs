/// Bounded pool of I/O tokens.
///
/// Limits how many directory listings are in flight at once. The number of
/// scan tasks is not limited; only the listing call itself waits for a
/// token. A bounded `crossbeam-channel` of unit values acts as the counting
/// semaphore: sending takes a token, receiving returns one.
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of concurrent directory listings.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

pub struct TokenPool {
    tx: Sender<()>,
    rx: Receiver<()>,
    capacity: usize,
    peak: AtomicUsize,
}

/// A held token. Returned to the pool on drop.
pub struct Token<'a> {
    pool: &'a TokenPool,
}

impl TokenPool {
    /// A pool of `capacity` tokens; `0` falls back to
    /// [`DEFAULT_MAX_CONCURRENCY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_MAX_CONCURRENCY
        } else {
            capacity
        };
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            peak: AtomicUsize::new(0),
        }
    }

    /// Block until a token is free and take it.
    pub fn acquire(&self) -> Token<'_> {
        // Both channel ends live in `self`, so the send cannot disconnect.
        let _ = self.tx.send(());
        self.peak.fetch_max(self.tx.len(), Ordering::Relaxed);
        Token { pool: self }
    }

    /// Number of tokens currently held.
    pub fn in_use(&self) -> usize {
        self.tx.len()
    }

    /// The most tokens ever held at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn reset_peak(&self) {
        self.peak.store(0, Ordering::Relaxed);
    }
}

impl Drop for Token<'_> {
    fn drop(&mut self) {
        let _ = self.pool.rx.try_recv();
    }
}
