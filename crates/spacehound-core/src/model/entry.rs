/// A single node of the scanned directory tree.
///
/// Entries live in the flat arena owned by [`EntryTree`](super::EntryTree).
/// Links between entries are `EntryIndex` values, so the `parent` back-link
/// is purely navigational and never owns anything.
use compact_str::CompactString;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Entries untouched for longer than this are reported as stale.
pub const STALE_AFTER_DAYS: u64 = 180;

/// Lightweight index into the entry arena.
///
/// `u32` keeps entries compact; four billion entries is beyond any real
/// filesystem a single scan will see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryIndex(pub u32);

impl EntryIndex {
    /// Create an index from a `usize` arena position.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "EntryIndex overflow");
        Self(index as u32)
    }

    /// The index as a `usize` for `Vec` indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A file or directory in the tree.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Absolute, normalised path. Unique per entry.
    pub path: PathBuf,

    /// Base name component only.
    pub name: CompactString,

    /// Bytes. For directories this is the sum of the children's sizes,
    /// re-established by [`EntryTree::aggregate_sizes`](super::EntryTree::aggregate_sizes).
    pub size: u64,

    pub is_dir: bool,

    /// Child entries. Insertion order while scanning, largest first once
    /// the tree has been aggregated.
    pub children: Vec<EntryIndex>,

    /// Non-owning link to the containing directory. `None` for the root.
    pub parent: Option<EntryIndex>,

    /// Last modification time, when the platform reported one.
    pub modified: Option<SystemTime>,

    /// `true` once the entry's metadata (and for directories, every child)
    /// has been populated.
    pub scanned: bool,
}

impl Entry {
    /// A fully-scanned file leaf.
    pub fn file(
        path: PathBuf,
        name: CompactString,
        size: u64,
        modified: Option<SystemTime>,
    ) -> Self {
        Self {
            path,
            name,
            size,
            is_dir: false,
            children: Vec::new(),
            parent: None,
            modified,
            scanned: true,
        }
    }

    /// A directory whose contents have not been populated yet.
    pub fn dir(path: PathBuf, name: CompactString, modified: Option<SystemTime>) -> Self {
        Self {
            path,
            name,
            size: 0,
            is_dir: true,
            children: Vec::new(),
            parent: None,
            modified,
            scanned: false,
        }
    }

    /// `true` if the entry has not been modified in [`STALE_AFTER_DAYS`].
    pub fn is_old(&self) -> bool {
        self.is_older_than(SystemTime::now(), stale_threshold())
    }

    /// `true` if `now - modified` exceeds `age`.
    ///
    /// Entries without a timestamp, or stamped in the future, are never old.
    pub fn is_older_than(&self, now: SystemTime, age: Duration) -> bool {
        self.modified
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|elapsed| elapsed > age)
    }
}

/// The default staleness window as a `Duration`.
pub fn stale_threshold() -> Duration {
    Duration::from_secs(STALE_AFTER_DAYS * 24 * 3600)
}
