/// Spacehound Core — scanning, search, and data model.
///
/// This crate contains all business logic with zero UI dependencies, so a
/// terminal UI, a plain-text printer or a CLI can all sit on top of it.
///
/// # Modules
///
/// - [`model`] — Arena-allocated entry tree and size helpers.
/// - [`scanner`] — Concurrent, I/O-bounded directory scanning.
/// - [`analysis`] — Bounded top-K fuzzy search and stale-file queries.
/// - [`platform`] — Path normalisation, long paths, reparse points.
/// - [`error`] — The fatal scan error type.
pub mod analysis;
pub mod error;
pub mod model;
pub mod platform;
pub mod scanner;

pub use analysis::{search_tree_bounded, SearchResult};
pub use error::ScanError;
pub use model::{Entry, EntryIndex, EntryTree};
pub use scanner::{start_scan, ScanHandle, Scanner};
