//! Hierarchical view over a torrent's flat file table.
//!
//! The flat table owned by the torrent handle stays authoritative. The tree
//! is derived from it and can be rebuilt at any time; nodes only store their
//! own segment name, so a leaf's full path is always the concatenation of its
//! ancestors' names.

use serde::Serialize;
use std::fmt;

use crate::models::{FileTable, Priority};

/// Index of a node inside a [`FileTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File { index: usize },
    Directory { children: Vec<NodeId> },
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
    size: u64,
    done: u64,
    priority: Priority,
}

impl TreeNode {
    /// On-disk segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn file_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::File { index } => Some(index),
            NodeKind::Directory { .. } => None,
        }
    }
}

/// One rendered row of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRow {
    pub depth: usize,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub done: u64,
    pub progress: f64,
    /// `None` for folders whose files disagree.
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    /// Leaf node of every file index.
    leaves: Vec<NodeId>,
    incomplete_suffix: String,
}

impl FileTree {
    /// Build the tree from a file table.
    pub fn build(table: &FileTable, incomplete_suffix: &str) -> Self {
        let mut tree = FileTree {
            nodes: vec![TreeNode {
                name: String::new(),
                parent: None,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
                size: 0,
                done: 0,
                priority: Priority::Normal,
            }],
            leaves: Vec::with_capacity(table.len()),
            incomplete_suffix: incomplete_suffix.to_string(),
        };

        for entry in table.iter() {
            let Some((file_name, dirs)) = entry.path.split_last() else {
                continue;
            };
            let mut current = tree.root();
            for dir in dirs {
                current = match tree.child_named(current, dir) {
                    Some(id) if !tree.at(id).is_file() => id,
                    _ => tree.push_child(current, dir, NodeKind::Directory { children: Vec::new() }),
                };
            }
            let leaf = tree.push_child(current, file_name, NodeKind::File { index: entry.index });
            tree.nodes[leaf.0].size = entry.size;
            tree.leaves.push(leaf);
        }

        tree.recompute();
        tree
    }

    /// Hidden root; its children are the top level entries.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// `None` when `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    fn at(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => &[],
        }
    }

    /// Leaf node holding the given file index.
    pub fn leaf(&self, index: usize) -> Option<NodeId> {
        self.leaves.get(index).copied()
    }

    /// Name shown to the user: the incomplete suffix is hidden on files.
    pub fn display_name(&self, id: NodeId) -> &str {
        let node = self.at(id);
        if node.is_file() && !self.incomplete_suffix.is_empty() {
            node.name
                .strip_suffix(self.incomplete_suffix.as_str())
                .filter(|stripped| !stripped.is_empty())
                .unwrap_or(node.name.as_str())
        } else {
            &node.name
        }
    }

    /// Path segments from the top level down to `id`.
    pub fn path_segments(&self, id: NodeId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root() {
                break;
            }
            let node = self.at(node_id);
            segments.push(node.name.clone());
            current = node.parent;
        }
        segments.reverse();
        segments
    }

    /// Find a node by its `/`-separated path. File names match with or
    /// without the incomplete suffix.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root();
        for segment in path.split(['/', '\\']).filter(|s| !s.is_empty()) {
            current = self
                .children(current)
                .iter()
                .copied()
                .find(|&child| self.at(child).name == segment)
                .or_else(|| {
                    self.children(current)
                        .iter()
                        .copied()
                        .find(|&child| self.display_name(child) == segment)
                })?;
        }
        (current != self.root()).then_some(current)
    }

    /// File indices of every leaf at or below `id`, in tree order.
    pub fn file_indices(&self, id: NodeId) -> Vec<usize> {
        let mut indices = Vec::new();
        self.collect_indices(id, &mut indices);
        indices
    }

    fn collect_indices(&self, id: NodeId, out: &mut Vec<usize>) {
        match &self.at(id).kind {
            NodeKind::File { index } => out.push(*index),
            NodeKind::Directory { children } => {
                for &child in children {
                    self.collect_indices(child, out);
                }
            }
        }
    }

    /// Rename a node in place. Descendant paths follow automatically.
    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if id != self.root() {
            self.nodes[id.0].name = name.to_string();
        }
    }

    /// Bytes done / bytes total for a node.
    pub fn progress(&self, id: NodeId) -> f64 {
        let node = self.at(id);
        if node.size == 0 {
            return if node.is_file() { 1.0 } else { 0.0 };
        }
        node.done as f64 / node.size as f64
    }

    /// Priority of a file, or the common priority of a folder's files.
    pub fn priority(&self, id: NodeId) -> Option<Priority> {
        let node = self.at(id);
        match &node.kind {
            NodeKind::File { .. } => Some(node.priority),
            NodeKind::Directory { children } => {
                let mut common = None;
                for &child in children {
                    let child_priority = self.priority(child)?;
                    match common {
                        None => common = Some(child_priority),
                        Some(p) if p != child_priority => return None,
                        Some(_) => {}
                    }
                }
                common
            }
        }
    }

    /// Set the priority of a file, or of every file below a folder.
    pub fn set_priority(&mut self, id: NodeId, priority: Priority) {
        for index in self.file_indices(id) {
            if let Some(leaf) = self.leaf(index) {
                self.nodes[leaf.0].priority = priority;
            }
        }
    }

    /// Priorities of every file, by file index.
    pub fn priorities(&self) -> Vec<Priority> {
        self.leaves
            .iter()
            .map(|leaf| self.at(*leaf).priority)
            .collect()
    }

    pub fn update_priorities(&mut self, priorities: &[Priority]) {
        for (index, priority) in priorities.iter().enumerate() {
            if let Some(leaf) = self.leaf(index) {
                self.nodes[leaf.0].priority = *priority;
            }
        }
    }

    /// Update per-file downloaded bytes and re-aggregate folders.
    pub fn update_progress(&mut self, done: &[u64]) {
        for (index, bytes) in done.iter().enumerate() {
            if let Some(leaf) = self.leaf(index) {
                let node = &mut self.nodes[leaf.0];
                node.done = (*bytes).min(node.size);
            }
        }
        self.recompute();
    }

    /// Depth-first rows, children in table order.
    pub fn rows(&self) -> Vec<FileRow> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        for &child in self.children(self.root()) {
            self.collect_rows(child, 0, &mut rows);
        }
        rows
    }

    fn collect_rows(&self, id: NodeId, depth: usize, rows: &mut Vec<FileRow>) {
        let node = self.at(id);
        rows.push(FileRow {
            depth,
            name: self.display_name(id).to_string(),
            is_dir: !node.is_file(),
            size: node.size,
            done: node.done,
            progress: self.progress(id),
            priority: self.priority(id),
        });
        for &child in self.children(id) {
            self.collect_rows(child, depth + 1, rows);
        }
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.at(child).name == name)
    }

    fn push_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            name: name.to_string(),
            parent: Some(parent),
            kind,
            size: 0,
            done: 0,
            priority: Priority::Normal,
        });
        if let NodeKind::Directory { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        id
    }

    /// Sum sizes and progress bottom-up. Children always have a higher id
    /// than their parent, so a reverse sweep visits them first.
    fn recompute(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let (size, done) = match &self.nodes[i].kind {
                NodeKind::File { .. } => continue,
                NodeKind::Directory { children } => children.iter().fold((0, 0), |acc, c| {
                    let child = &self.nodes[c.0];
                    (acc.0 + child.size, acc.1 + child.done)
                }),
            };
            self.nodes[i].size = size;
            self.nodes[i].done = done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(paths: &[(&str, u64)]) -> FileTable {
        FileTable::from_paths(
            paths
                .iter()
                .map(|(p, size)| (p.split('/').map(String::from).collect(), *size)),
        )
    }

    #[test]
    fn test_build_preserves_paths() {
        let table = table(&[
            ("a/b/x.txt", 100),
            ("a/b/y.txt", 50),
            ("a/z.bin", 10),
        ]);
        let tree = FileTree::build(&table, ".!qB");

        assert_eq!(tree.file_count(), 3);
        for entry in table.iter() {
            let leaf = tree.leaf(entry.index).unwrap();
            assert_eq!(tree.path_segments(leaf), entry.path);
        }

        let b = tree.find("a/b").unwrap();
        assert!(!tree.node(b).unwrap().is_file());
        assert_eq!(tree.file_indices(b), vec![0, 1]);
        assert_eq!(tree.node(tree.find("a").unwrap()).unwrap().size, 160);
    }

    #[test]
    fn test_display_name_hides_incomplete_suffix() {
        let tree = FileTree::build(&table(&[("movie.mkv.!qB", 10)]), ".!qB");
        let leaf = tree.leaf(0).unwrap();
        assert_eq!(tree.node(leaf).unwrap().name(), "movie.mkv.!qB");
        assert_eq!(tree.display_name(leaf), "movie.mkv");
        assert_eq!(tree.find("movie.mkv"), Some(leaf));
        assert_eq!(tree.find("movie.mkv.!qB"), Some(leaf));
    }

    #[test]
    fn test_rename_directory_moves_descendants() {
        let mut tree = FileTree::build(&table(&[("a/b/x.txt", 1), ("a/b/y.txt", 1)]), ".!qB");
        let b = tree.find("a/b").unwrap();
        tree.set_name(b, "c");
        let leaf = tree.leaf(1).unwrap();
        assert_eq!(tree.path_segments(leaf), vec!["a", "c", "y.txt"]);
        assert!(tree.find("a/b").is_none());
    }

    #[test]
    fn test_progress_and_priority_aggregation() {
        let mut tree = FileTree::build(&table(&[("d/one", 100), ("d/two", 300)]), ".!qB");
        tree.update_progress(&[100, 100]);
        let d = tree.find("d").unwrap();
        assert!((tree.progress(d) - 0.5).abs() < f64::EPSILON);

        assert_eq!(tree.priority(d), Some(Priority::Normal));
        tree.update_priorities(&[Priority::High, Priority::Normal]);
        assert_eq!(tree.priority(d), None);

        tree.set_priority(d, Priority::Maximum);
        assert_eq!(tree.priorities(), vec![Priority::Maximum, Priority::Maximum]);

        let rows = tree.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "d");
        assert!(rows[0].is_dir);
        assert_eq!(rows[2].depth, 1);
    }
}
