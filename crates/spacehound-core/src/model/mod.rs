/// Data model for the scanned directory tree.
///
/// Re-exports the arena-allocated tree and its supporting types.
pub mod entry;
pub mod entry_tree;
pub mod size;

pub use entry::{Entry, EntryIndex, STALE_AFTER_DAYS};
pub use entry_tree::EntryTree;
