/// Capped, append-only log of non-fatal scan warnings.
///
/// A permission-locked subtree can fail on every entry; the cap keeps such
/// trees from filling memory with warning text.
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Maximum warnings retained per scan.
pub const MAX_WARNINGS: usize = 500;

pub struct WarningLog {
    entries: Mutex<Vec<String>>,
    cap: usize,
    dropped: AtomicU64,
}

impl WarningLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            cap,
            dropped: AtomicU64::new(0),
        }
    }

    /// Record a warning, or count it as dropped once the cap is reached.
    pub fn push(&self, message: String) {
        let mut entries = self.entries.lock();
        if entries.len() < self.cap {
            debug!("scan warning: {message}");
            entries.push(message);
            return;
        }
        drop(entries);
        if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
            warn!(
                "warning limit of {} reached; further warnings are discarded",
                self.cap
            );
        }
    }

    /// Copy of the retained warnings, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Warnings discarded because the log was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for WarningLog {
    fn default() -> Self {
        Self::new(MAX_WARNINGS)
    }
}
