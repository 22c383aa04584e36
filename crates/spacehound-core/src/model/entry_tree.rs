/// Arena-backed entry tree with an O(n) bottom-up size aggregation.
///
/// All entries live in a single `Vec<Entry>`. Children are always allocated
/// after their parent, which lets aggregation walk the arena in reverse
/// instead of recursing.
use super::entry::{Entry, EntryIndex};

/// The complete tree produced by one scan.
#[derive(Debug, Clone)]
pub struct EntryTree {
    /// Arena: every entry in a flat vector. Index 0 is the root.
    nodes: Vec<Entry>,
}

impl EntryTree {
    /// Create a tree holding only `root`.
    pub fn new(root: Entry) -> Self {
        Self::with_capacity(root, 1)
    }

    /// Create a tree holding only `root`, reserving room for
    /// `estimated_entries` entries in total.
    pub fn with_capacity(mut root: Entry, estimated_entries: usize) -> Self {
        root.parent = None;
        let mut nodes = Vec::with_capacity(estimated_entries.max(1));
        nodes.push(root);
        Self { nodes }
    }

    /// Index of the root entry.
    #[inline]
    pub fn root(&self) -> EntryIndex {
        EntryIndex(0)
    }

    /// Allocate `entry` in the arena and append it to `parent`'s children.
    pub fn add_child(&mut self, parent: EntryIndex, mut entry: Entry) -> EntryIndex {
        let idx = EntryIndex::new(self.nodes.len());
        entry.parent = Some(parent);
        self.nodes.push(entry);
        self.nodes[parent.idx()].children.push(idx);
        idx
    }

    /// Compute directory sizes and order every directory's children by size,
    /// largest first.
    ///
    /// Iterating the arena in reverse visits every child before its parent,
    /// so each directory sums already-final child sizes. Directory sizes are
    /// rebuilt from their children on every call, so repeated calls are
    /// harmless. Equal-sized siblings end up in no particular order.
    pub fn aggregate_sizes(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            if !self.nodes[i].is_dir {
                continue;
            }
            let mut children = std::mem::take(&mut self.nodes[i].children);
            let total = children
                .iter()
                .map(|child| self.nodes[child.idx()].size)
                .sum();
            children.sort_unstable_by(|a, b| {
                self.nodes[b.idx()].size.cmp(&self.nodes[a.idx()].size)
            });

            let dir = &mut self.nodes[i];
            dir.size = total;
            dir.children = children;
        }
    }

    /// The entry at `index`.
    #[inline]
    pub fn get(&self, index: EntryIndex) -> &Entry {
        &self.nodes[index.idx()]
    }

    /// Mutable access for collaborators that annotate entries in place.
    #[inline]
    pub fn get_mut(&mut self, index: EntryIndex) -> &mut Entry {
        &mut self.nodes[index.idx()]
    }

    /// Direct children of `index`, in their current order.
    #[inline]
    pub fn children(&self, index: EntryIndex) -> &[EntryIndex] {
        &self.nodes[index.idx()].children
    }

    /// The containing directory of `index`, if any.
    #[inline]
    pub fn parent(&self, index: EntryIndex) -> Option<EntryIndex> {
        self.nodes[index.idx()].parent
    }

    /// Ancestors of `index`, ordered from the root down to its parent.
    ///
    /// Empty for the root itself. Used to rebuild a navigation trail for an
    /// entry reached by search rather than by browsing.
    pub fn breadcrumb(&self, index: EntryIndex) -> Vec<EntryIndex> {
        let mut trail = Vec::new();
        let mut current = self.parent(index);
        while let Some(idx) = current {
            trail.push(idx);
            current = self.parent(idx);
        }
        trail.reverse();
        trail
    }

    /// Position of `index` within its parent's children.
    pub fn position_in_parent(&self, index: EntryIndex) -> Option<usize> {
        let parent = self.parent(index)?;
        self.children(parent).iter().position(|&c| c == index)
    }

    /// Share of the parent's size taken by `index`, in percent (0.0–100.0).
    ///
    /// The root measures against itself.
    pub fn percent_of_parent(&self, index: EntryIndex) -> f64 {
        let size = self.get(index).size;
        let parent_size = self
            .parent(index)
            .map(|p| self.get(p).size)
            .unwrap_or(size);
        if parent_size == 0 {
            0.0
        } else {
            size as f64 / parent_size as f64 * 100.0
        }
    }

    /// Iterate over every entry with its index, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryIndex, &Entry)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, entry)| (EntryIndex::new(i), entry))
    }

    /// Total number of entries, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    /// root/{a(dir, 10 bytes), b(dir, 30 bytes), c.txt(5 bytes)}
    fn sample_tree() -> (EntryTree, [EntryIndex; 3]) {
        let mut tree = EntryTree::new(dir("/root"));
        let root = tree.root();
        let a = tree.add_child(root, dir("/root/a"));
        tree.add_child(a, file("/root/a/one.bin", 4));
        tree.add_child(a, file("/root/a/two.bin", 6));
        let b = tree.add_child(root, dir("/root/b"));
        tree.add_child(b, file("/root/b/three.bin", 30));
        let c = tree.add_child(root, file("/root/c.txt", 5));
        (tree, [a, b, c])
    }

    #[test]
    fn test_tree_aggregation() {
        let (mut tree, [a, b, c]) = sample_tree();
        tree.aggregate_sizes();

        assert_eq!(tree.get(a).size, 10);
        assert_eq!(tree.get(b).size, 30);
        assert_eq!(tree.get(tree.root()).size, 45);
        assert_eq!(tree.children(tree.root()), &[b, a, c]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let (mut tree, _) = sample_tree();
        tree.aggregate_sizes();
        tree.aggregate_sizes();
        assert_eq!(tree.get(tree.root()).size, 45);
    }

    #[test]
    fn test_every_directory_sums_its_children() {
        let (mut tree, _) = sample_tree();
        tree.aggregate_sizes();
        for (idx, entry) in tree.iter().filter(|(_, e)| e.is_dir) {
            let sum: u64 = tree.children(idx).iter().map(|c| tree.get(*c).size).sum();
            assert_eq!(entry.size, sum, "{}", entry.path.display());
            assert!(tree
                .children(idx)
                .windows(2)
                .all(|w| tree.get(w[0]).size >= tree.get(w[1]).size));
        }
    }

    #[test]
    fn test_empty_directory_has_zero_size() {
        let mut tree = EntryTree::new(dir("/root"));
        let empty = tree.add_child(tree.root(), dir("/root/empty"));
        tree.aggregate_sizes();
        assert_eq!(tree.get(empty).size, 0);
        assert!(tree.children(empty).is_empty());
    }

    #[test]
    fn test_parent_links_match_children() {
        let (tree, _) = sample_tree();
        for (idx, _) in tree.iter() {
            for &child in tree.children(idx) {
                assert_eq!(tree.parent(child), Some(idx));
            }
        }
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_breadcrumb_and_position() {
        let (mut tree, [a, _, _]) = sample_tree();
        tree.aggregate_sizes();
        let two = tree.children(a)[0];
        assert_eq!(tree.get(two).name, "two.bin");

        assert_eq!(tree.breadcrumb(two), vec![tree.root(), a]);
        assert!(tree.breadcrumb(tree.root()).is_empty());
        assert_eq!(tree.position_in_parent(a), Some(1));
        assert_eq!(tree.position_in_parent(tree.root()), None);
    }

    #[test]
    fn test_percent_of_parent() {
        let (mut tree, [_, b, _]) = sample_tree();
        tree.aggregate_sizes();
        let pct = tree.percent_of_parent(b);
        assert!((pct - 30.0 / 45.0 * 100.0).abs() < 1e-9);
        assert_eq!(tree.percent_of_parent(tree.root()), 100.0);

        let empty = EntryTree::new(dir("/nothing"));
        assert_eq!(empty.percent_of_parent(empty.root()), 0.0);
    }
}
