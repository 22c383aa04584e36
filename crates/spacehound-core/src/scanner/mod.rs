/// Scanner module — concurrent directory tree scanning.
///
/// A [`Scanner`] owns the per-scan shared state: the I/O token pool, the
/// exclusion set, the capped warning log and the progress counter. Each
/// call to [`Scanner::scan`] walks the tree on a dedicated rayon pool,
/// then aggregates sizes on the calling thread.
///
/// [`start_scan`] runs a scan on a background thread so a UI can poll
/// [`ScanHandle::scanned_count`] while it progresses.
pub mod parallel;
pub mod progress;
pub mod token_pool;
pub mod warnings;

pub use progress::{ScanProgress, ScanReport};
pub use token_pool::{TokenPool, DEFAULT_MAX_CONCURRENCY};
pub use warnings::{WarningLog, MAX_WARNINGS};

use crate::error::ScanError;
use crate::model::{Entry, EntryTree};
use crate::platform::{display_name, extended_length, normalize};
use compact_str::CompactString;
use crossbeam_channel::{Receiver, TryRecvError};
use parallel::PendingEntry;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// Stack size for scan worker threads.
///
/// Nested scopes run inline on whichever worker waits on them, so one
/// thread can carry a frame per directory level of a deep tree.
const SCAN_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Concurrent tree scanner.
///
/// Reusable across scans; the warning log and counter are reset when a
/// scan starts. Scans on one instance never overlap: a scan started while
/// another is running waits for it to finish.
pub struct Scanner {
    tokens: TokenPool,
    excluded: HashSet<String>,
    warnings: WarningLog,
    scanned_count: AtomicU64,
    /// Held for the whole of a scan, including the report snapshot.
    scan_lock: Mutex<()>,
}

impl Scanner {
    /// Create a scanner allowing `max_concurrency` simultaneous directory
    /// listings (`0` selects [`DEFAULT_MAX_CONCURRENCY`]) and skipping
    /// directories whose base name matches `excluded`, ignoring case.
    pub fn new<I, S>(max_concurrency: usize, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: TokenPool::new(max_concurrency),
            excluded: excluded
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
            warnings: WarningLog::default(),
            scanned_count: AtomicU64::new(0),
            scan_lock: Mutex::new(()),
        }
    }

    /// Scan `root` into a size-aggregated tree.
    ///
    /// Only a root that cannot be resolved or statted is an error. Every
    /// other failure is recorded in [`warnings`](Self::warnings) and the
    /// affected entry is left out.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<EntryTree, ScanError> {
        self.scan_report(root).map(|report| report.tree)
    }

    /// Scan `root` and capture this scan's counter and warnings with the
    /// tree.
    ///
    /// The figures are taken before another scan on this instance can
    /// start, so they never mix with a concurrent caller's.
    pub fn scan_report(&self, root: impl AsRef<Path>) -> Result<ScanReport, ScanError> {
        let _exclusive = self.scan_lock.lock();
        let start = Instant::now();
        let tree = self.scan_exclusive(root.as_ref())?;
        Ok(ScanReport {
            tree,
            duration: start.elapsed(),
            scanned_count: self.scanned_count(),
            warnings: self.warnings(),
        })
    }

    fn scan_exclusive(&self, requested: &Path) -> Result<EntryTree, ScanError> {
        let root_path = normalize(requested).map_err(|source| ScanError::Resolve {
            path: requested.to_path_buf(),
            source,
        })?;

        self.warnings.clear();
        self.scanned_count.store(0, Ordering::Relaxed);
        self.tokens.reset_peak();

        let start = Instant::now();
        info!("Starting scan of {}", root_path.display());

        let meta = fs::symlink_metadata(extended_length(&root_path)).map_err(|source| {
            ScanError::Root {
                path: root_path.clone(),
                source,
            }
        })?;
        let name = CompactString::new(display_name(&root_path));
        let modified = meta.modified().ok();

        if !meta.is_dir() {
            return Ok(EntryTree::new(Entry::file(
                root_path,
                name,
                meta.len(),
                modified,
            )));
        }

        // Every in-flight listing pins a worker, so the pool must be at
        // least as large as the token pool for all tokens to be usable.
        let threads = num_cpus::get().max(self.tokens.capacity()).max(2);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .stack_size(SCAN_STACK_SIZE)
            .thread_name(|i| format!("spacehound-scan-{i}"))
            .build()?;
        debug!(
            "scan pool: {threads} threads, {} listing tokens",
            self.tokens.capacity()
        );

        let mut root = PendingEntry::new(Entry::dir(root_path, name, modified));
        pool.install(|| self.expand_dir(&mut root));
        let walked = start.elapsed();

        let mut tree = parallel::into_tree(root, self.scanned_count() as usize + 1);
        tree.aggregate_sizes();
        let root_idx = tree.root();
        tree.get_mut(root_idx).scanned = true;

        info!(
            "Scan complete: {} entries observed, {} in tree, {} warnings; walk {:?}, total {:?}",
            self.scanned_count(),
            tree.len(),
            self.warnings.len(),
            walked,
            start.elapsed()
        );
        Ok(tree)
    }

    /// Snapshot of the warnings recorded so far (at most [`MAX_WARNINGS`]).
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.snapshot()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Warnings discarded after the log filled up.
    pub fn dropped_warnings(&self) -> u64 {
        self.warnings.dropped()
    }

    /// Entries observed so far. Safe to poll from any thread mid-scan.
    pub fn scanned_count(&self) -> u64 {
        self.scanned_count.load(Ordering::Relaxed)
    }

    /// Most directory listings that were in flight at once during the
    /// current or last scan.
    pub fn peak_concurrent_listings(&self) -> usize {
        self.tokens.peak()
    }

    pub fn max_concurrency(&self) -> usize {
        self.tokens.capacity()
    }

    fn is_excluded(&self, name: &str) -> bool {
        !self.excluded.is_empty() && self.excluded.contains(&name.to_lowercase())
    }

    fn warn(&self, message: String) {
        self.warnings.push(message);
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY, std::iter::empty::<&str>())
    }
}

/// Handle to a scan running on a background thread.
///
/// Dropping the handle blocks until the scan thread has finished; the
/// scan cannot outlive it.
pub struct ScanHandle {
    outcome_rx: Receiver<ScanProgress>,
    scanner: Arc<Scanner>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Entries observed so far.
    pub fn scanned_count(&self) -> u64 {
        self.scanner.scanned_count()
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> Vec<String> {
        self.scanner.warnings()
    }

    /// The outcome, if the scan has finished. Returns `None` while running.
    pub fn try_finish(&mut self) -> Option<Result<ScanReport, ScanError>> {
        match self.outcome_rx.try_recv() {
            Ok(progress) => {
                self.join();
                Some(progress.into_result())
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(ScanError::Disconnected))
            }
        }
    }

    /// Block until the scan finishes.
    pub fn wait(mut self) -> Result<ScanReport, ScanError> {
        let outcome = self
            .outcome_rx
            .recv()
            .map_err(|_| ScanError::Disconnected)
            .and_then(ScanProgress::into_result);
        self.join();
        outcome
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            // The thread has already sent (or dropped) its only message.
            let _ = thread.join();
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            debug!("scan handle dropped before completion; waiting for scan thread");
        }
        self.join();
    }
}

/// Start scanning `root` on a background thread.
///
/// The scan runs to completion; there is no cancellation.
pub fn start_scan(scanner: Arc<Scanner>, root: PathBuf) -> Result<ScanHandle, ScanError> {
    let (outcome_tx, outcome_rx) = crossbeam_channel::bounded::<ScanProgress>(1);
    let worker = Arc::clone(&scanner);

    let thread = thread::Builder::new()
        .name("spacehound-scanner".into())
        .spawn(move || {
            let progress = match worker.scan_report(&root) {
                Ok(report) => ScanProgress::Complete(report),
                Err(err) => ScanProgress::Failed(err),
            };
            let _ = outcome_tx.send(progress);
        })
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        outcome_rx,
        scanner,
        thread: Some(thread),
    })
}
