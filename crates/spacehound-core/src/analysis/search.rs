/// Bounded top-K fuzzy search over a scanned tree.
///
/// Every entry below the search root is scored with [`FuzzyPattern`], but
/// only the best `max_results` survive: a min-heap keeps the current worst
/// survivor on top, so memory stays O(K) however many entries match.
///
/// Ranking is by score, then by size (larger entries win ties). Results
/// come back best first.
use super::fuzzy::FuzzyPattern;
use crate::model::{EntryIndex, EntryTree};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A matched entry and its fuzzy score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub index: EntryIndex,
    pub score: u32,
}

/// Heap element. Ordered by `(score, size)`; the arena index only breaks
/// exact ties so the order is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    score: u32,
    size: u64,
    index: EntryIndex,
}

impl Candidate {
    #[inline]
    fn rank(&self) -> (u32, u64) {
        (self.score, self.size)
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            // Earlier arena position ranks higher among exact ties.
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the `max_results` best fuzzy matches for `query` below `root`.
///
/// `root` itself is never a result. An empty query or `max_results == 0`
/// yields no results. Output is ordered by score descending, then size
/// descending.
pub fn search_tree_bounded(
    tree: &EntryTree,
    root: EntryIndex,
    query: &str,
    max_results: usize,
) -> Vec<SearchResult> {
    let pattern = FuzzyPattern::new(query);
    if pattern.is_empty() || max_results == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> =
        BinaryHeap::with_capacity(max_results.min(tree.len()));
    let mut stack: Vec<EntryIndex> = tree.children(root).iter().rev().copied().collect();

    while let Some(index) = stack.pop() {
        let entry = tree.get(index);
        stack.extend(entry.children.iter().rev().copied());

        let Some(score) = pattern.score(&entry.name) else {
            continue;
        };
        let candidate = Candidate {
            score,
            size: entry.size,
            index,
        };

        if heap.len() < max_results {
            heap.push(Reverse(candidate));
        } else if let Some(mut worst) = heap.peek_mut() {
            // Only a strictly better (score, size) displaces the worst.
            if candidate.rank() > worst.0.rank() {
                *worst = Reverse(candidate);
            }
        }
    }

    // Ascending order of `Reverse` is descending order of candidates.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(c)| SearchResult {
            index: c.index,
            score: c.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;
    use compact_str::CompactString;
    use std::path::PathBuf;

    fn dir(path: &str) -> Entry {
        let path = PathBuf::from(path);
        let name = CompactString::new(path.file_name().unwrap().to_string_lossy());
        Entry::dir(path, name, None)
    }

    fn file(path: &str, size: u64) -> Entry {
        let path = PathBuf::from(path);
        let name = CompactString::new(path.file_name().unwrap().to_string_lossy());
        Entry::file(path, name, size, None)
    }

    fn sample_tree() -> EntryTree {
        let mut tree = EntryTree::new(dir("/logs"));
        let root = tree.root();
        let app = tree.add_child(root, dir("/logs/app"));
        tree.add_child(app, file("/logs/app/app.log", 300));
        tree.add_child(app, file("/logs/app/catalog.db", 50));
        tree.add_child(root, file("/logs/syslog", 700));
        tree.add_child(root, file("/logs/readme.txt", 10));
        tree.aggregate_sizes();
        tree
    }

    fn names<'t>(tree: &'t EntryTree, results: &[SearchResult]) -> Vec<&'t str> {
        results.iter().map(|r| tree.get(r.index).name.as_str()).collect()
    }

    #[test]
    fn test_degenerate_inputs_return_nothing() {
        let tree = sample_tree();
        assert!(search_tree_bounded(&tree, tree.root(), "", 10).is_empty());
        assert!(search_tree_bounded(&tree, tree.root(), "x", 0).is_empty());
    }

    #[test]
    fn test_root_is_not_a_result() {
        let tree = sample_tree();
        let results = search_tree_bounded(&tree, tree.root(), "logs", 10);
        assert!(results.iter().all(|r| r.index != tree.root()));
    }

    #[test]
    fn test_results_ordered_by_score_then_size() {
        let tree = sample_tree();
        let results = search_tree_bounded(&tree, tree.root(), "log", 10);

        // app.log: l after '.', contiguous -> 10. catalog.db and syslog: 7.
        assert_eq!(names(&tree, &results), ["app.log", "syslog", "catalog.db"]);
        assert_eq!(results[0].score, 10);
        assert_eq!(results[1].score, 7);
        assert_eq!(results[2].score, 7);
    }

    #[test]
    fn test_bound_keeps_best() {
        let tree = sample_tree();
        let results = search_tree_bounded(&tree, tree.root(), "log", 2);
        assert_eq!(names(&tree, &results), ["app.log", "syslog"]);
    }

    #[test]
    fn test_search_from_subtree() {
        let tree = sample_tree();
        let app = *tree
            .children(tree.root())
            .iter()
            .find(|&&c| tree.get(c).name == "app")
            .unwrap();
        let results = search_tree_bounded(&tree, app, "log", 10);
        assert_eq!(names(&tree, &results), ["app.log", "catalog.db"]);
    }

    #[test]
    fn test_equal_score_larger_size_displaces() {
        let mut tree = EntryTree::new(dir("/r"));
        let root = tree.root();
        for (i, size) in [5u64, 1, 9, 3, 7].into_iter().enumerate() {
            tree.add_child(root, file(&format!("/r/x{i}"), size));
        }
        let results = search_tree_bounded(&tree, root, "x", 3);
        let sizes: Vec<u64> = results.iter().map(|r| tree.get(r.index).size).collect();
        assert_eq!(sizes, [9, 7, 5]);
    }

    #[test]
    fn test_thousand_matches_bounded_to_five() {
        let mut tree = EntryTree::new(dir("/var"));
        let root = tree.root();
        let mut all = Vec::new();
        for i in 0..1000u64 {
            // Alternate names so scores differ; sizes vary inside a score class.
            let name = if i % 3 == 0 {
                format!("log_{i}")
            } else {
                format!("x_l_o_g_{i}")
            };
            let idx = tree.add_child(root, file(&format!("/var/{name}"), (i * 37) % 1000));
            all.push(idx);
        }

        let results = search_tree_bounded(&tree, root, "log", 5);
        assert_eq!(results.len(), 5);

        let key = |idx: EntryIndex, score: u32| (score, tree.get(idx).size);
        let worst_kept = results
            .iter()
            .map(|r| key(r.index, r.score))
            .min()
            .unwrap();
        for idx in all {
            if results.iter().any(|r| r.index == idx) {
                continue;
            }
            let score = FuzzyPattern::new("log").score(&tree.get(idx).name).unwrap();
            assert!(key(idx, score) <= worst_kept);
        }

        assert!(results
            .windows(2)
            .all(|w| key(w[0].index, w[0].score) >= key(w[1].index, w[1].score)));
    }
}
