/// Recursive parallel directory expansion.
///
/// Every subdirectory is expanded by its own task spawned into a
/// `rayon::scope`; the scope does not return until all of those tasks have
/// finished, so a directory is complete when `expand_dir` returns and no
/// task outlives the directory that spawned it.
///
/// # Token discipline
///
/// The I/O token is held only while a listing is read into memory. It is
/// released before any child task is spawned: nested tasks need tokens of
/// their own, and holding one across recursion would deadlock as soon as
/// every token sat with a parent waiting on its children.
///
/// # Building the arena
///
/// Tasks build a nested `PendingEntry` tree. Siblings push into their
/// parent's `Mutex<Vec<_>>`, so only siblings ever contend on a lock. Once
/// the whole walk has joined, [`into_tree`] moves the nested tree into the
/// flat [`EntryTree`] arena on a single thread.
use super::Scanner;
use crate::model::{Entry, EntryIndex, EntryTree};
use crate::platform::{extended_length, is_reparse_point};
use compact_str::CompactString;
use parking_lot::Mutex;
use std::fs::{self, DirEntry, FileType};
use std::io;
use std::path::Path;
use std::sync::atomic::Ordering;
use tracing::trace;

/// An entry plus the children discovered for it, before arena insertion.
pub(crate) struct PendingEntry {
    pub(crate) entry: Entry,
    pub(crate) children: Vec<PendingEntry>,
}

impl PendingEntry {
    pub(crate) fn new(entry: Entry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }
}

impl Scanner {
    /// Populate `dir.children`, recursing into subdirectories in parallel.
    ///
    /// Must run inside a rayon pool. Failures are recorded as warnings and
    /// leave the directory with whatever children could be read.
    pub(crate) fn expand_dir(&self, dir: &mut PendingEntry) {
        let listing = match self.list_dir(&dir.entry.path) {
            Ok(listing) => listing,
            Err(err) => {
                self.warn(format!("cannot read {}: {err}", dir.entry.path.display()));
                return;
            }
        };

        let children = Mutex::new(Vec::with_capacity(listing.len()));
        let parent_path = dir.entry.path.as_path();

        rayon::scope(|s| {
            for item in listing {
                self.scanned_count.fetch_add(1, Ordering::Relaxed);

                let dir_entry = match item {
                    Ok(dir_entry) => dir_entry,
                    Err(err) => {
                        self.warn(format!(
                            "cannot read entry in {}: {err}",
                            parent_path.display()
                        ));
                        continue;
                    }
                };

                let Some(child) = self.classify(parent_path, &dir_entry) else {
                    continue;
                };

                if child.is_dir {
                    let children = &children;
                    s.spawn(move |_| {
                        let mut pending = PendingEntry::new(child);
                        self.expand_dir(&mut pending);
                        pending.entry.scanned = true;
                        children.lock().push(pending);
                    });
                } else {
                    children.lock().push(PendingEntry::new(child));
                }
            }
        });

        dir.children = children.into_inner();
    }

    /// Read a whole directory listing while holding one I/O token.
    ///
    /// `fs::read_dir` is lazy, so the entries are collected before the token
    /// is released. Per-item errors are kept so the caller can skip just
    /// that item.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<io::Result<DirEntry>>> {
        let _token = self.tokens.acquire();
        let read_dir = fs::read_dir(extended_length(path))?;
        Ok(read_dir.collect())
    }

    /// Turn one listed item into an `Entry`, or `None` if it must be
    /// skipped (excluded, link to a directory, unreadable).
    fn classify(&self, parent: &Path, dir_entry: &DirEntry) -> Option<Entry> {
        let file_name = dir_entry.file_name();
        let name = file_name.to_string_lossy();
        let path = parent.join(&file_name);

        let file_type = match dir_entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                self.warn(format!("cannot stat {}: {err}", path.display()));
                return None;
            }
        };

        let is_dir = file_type.is_dir() || (file_type.is_symlink() && resolves_to_dir(&path));

        if is_dir && self.is_excluded(&name) {
            trace!("excluded {}", path.display());
            return None;
        }

        if is_dir && is_link_like(file_type, &path) {
            self.warn(format!("skipping junction/reparse: {}", path.display()));
            return None;
        }

        let meta = match dir_entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                self.warn(format!("cannot stat {}: {err}", path.display()));
                return None;
            }
        };

        let name = CompactString::new(&name);
        let modified = meta.modified().ok();
        Some(if is_dir {
            Entry::dir(path, name, modified)
        } else {
            Entry::file(path, name, meta.len(), modified)
        })
    }
}

/// `true` if a symlink at `path` points at a directory.
fn resolves_to_dir(path: &Path) -> bool {
    fs::metadata(extended_length(path))
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// `true` for directories that redirect elsewhere and must not be entered.
///
/// `DirEntry::file_type` already reports symlinks and name-surrogate
/// reparse points (junctions, mount points). Windows has further reparse
/// kinds that only the attribute query sees.
fn is_link_like(file_type: FileType, path: &Path) -> bool {
    file_type.is_symlink() || (cfg!(windows) && is_reparse_point(path))
}

/// Move a finished walk into the arena, preserving sibling order.
///
/// Every child is allocated before any of its own children, which is the
/// ordering [`EntryTree::aggregate_sizes`] relies on. Uses an explicit
/// stack, so tree depth is not bounded by the call stack.
pub(crate) fn into_tree(root: PendingEntry, estimated_entries: usize) -> EntryTree {
    let PendingEntry { entry, children } = root;
    let mut tree = EntryTree::with_capacity(entry, estimated_entries);

    let mut stack: Vec<(EntryIndex, Vec<PendingEntry>)> = vec![(tree.root(), children)];
    while let Some((parent, children)) = stack.pop() {
        for PendingEntry { entry, children } in children {
            let idx = tree.add_child(parent, entry);
            if !children.is_empty() {
                stack.push((idx, children));
            }
        }
    }
    tree
}
