/// File age analysis — find large files that have not been modified in a
/// long time.
use crate::model::entry::stale_threshold;
use crate::model::{EntryIndex, EntryTree};
use std::time::{Duration, SystemTime};

/// A file identified as stale.
#[derive(Debug, Clone)]
pub struct StaleFile {
    pub index: EntryIndex,
    pub size: u64,
    pub last_modified: SystemTime,
    pub age_days: u64,
}

/// Stale files using the default 180-day window, largest first.
pub fn stale_files(tree: &EntryTree, max_results: usize) -> Vec<StaleFile> {
    collect_stale(tree, SystemTime::now(), stale_threshold(), max_results)
}

/// Files not modified in the last `min_age_days` days, largest first.
///
/// Directories and entries without a timestamp are never reported.
/// `max_results == 0` returns an empty vec.
pub fn find_stale_files(tree: &EntryTree, min_age_days: u64, max_results: usize) -> Vec<StaleFile> {
    let window = Duration::from_secs(min_age_days.saturating_mul(86_400));
    collect_stale(tree, SystemTime::now(), window, max_results)
}

fn collect_stale(
    tree: &EntryTree,
    now: SystemTime,
    window: Duration,
    max_results: usize,
) -> Vec<StaleFile> {
    if max_results == 0 {
        return Vec::new();
    }

    let mut stale: Vec<StaleFile> = tree
        .iter()
        .filter(|(_, entry)| !entry.is_dir)
        .filter_map(|(index, entry)| {
            let modified = entry.modified?;
            let age = now.duration_since(modified).ok()?;
            (age >= window).then(|| StaleFile {
                index,
                size: entry.size,
                last_modified: modified,
                age_days: age.as_secs() / 86_400,
            })
        })
        .collect();

    // O(n) selection of the top k, then sort only those.
    if stale.len() > max_results {
        stale.select_nth_unstable_by(max_results - 1, |a, b| b.size.cmp(&a.size));
        stale.truncate(max_results);
    }
    stale.sort_unstable_by(|a, b| b.size.cmp(&a.size));
    stale
}
