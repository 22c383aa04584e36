/// Messages reported by a background scan.
use crate::error::ScanError;
use crate::model::EntryTree;
use std::time::Duration;

/// The outcome of a finished scan and the figures gathered along the way.
#[derive(Debug)]
pub struct ScanReport {
    /// The aggregated tree.
    pub tree: EntryTree,
    /// Wall-clock time from start to aggregated tree.
    pub duration: Duration,
    /// Entries observed while listing directories.
    pub scanned_count: u64,
    /// Snapshot of the (capped) warning log at completion.
    pub warnings: Vec<String>,
}

/// The single message a background scan sends when it ends.
#[derive(Debug)]
pub enum ScanProgress {
    /// Scanning completed; the tree is aggregated and sorted.
    Complete(ScanReport),
    /// The root could not be scanned at all.
    Failed(ScanError),
}

impl ScanProgress {
    pub fn into_result(self) -> Result<ScanReport, ScanError> {
        match self {
            Self::Complete(report) => Ok(report),
            Self::Failed(err) => Err(err),
        }
    }
}
