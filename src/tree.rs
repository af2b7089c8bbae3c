//! # Repository Tree Model
//!
//! An immutable snapshot of a repository listing. Tree sources build it, the
//! aggregator walks it, and nothing in the crate mutates it afterwards.
//!
//! Paths are repository-relative and `/`-separated. The root node is a
//! directory with an empty path.

use serde::{Deserialize, Serialize};

/// Whether a node is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// A single entry in a repository tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Repository-relative path of this node
    pub path: String,

    /// File or directory
    pub kind: NodeKind,

    /// Children in listing order; always empty for files
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a file node
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
        }
    }

    /// Create a directory node with the given children
    pub fn directory(path: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            children,
        }
    }

    /// Create an empty root directory
    pub fn root() -> Self {
        Self::directory("", Vec::new())
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// All file nodes, depth-first in child order
    pub fn files(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a TreeNode>) {
        match self.kind {
            NodeKind::File => out.push(self),
            NodeKind::Directory => {
                for child in &self.children {
                    child.collect_files(out);
                }
            }
        }
    }

    /// Build a nested tree from a flat listing of `/`-separated paths.
    ///
    /// Entries keep their listing order within each directory. Directories
    /// that are only implied by a deeper path are created on first use. A
    /// path listed twice keeps its first occurrence.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, NodeKind)>,
        S: AsRef<str>,
    {
        let mut root = Self::root();
        for (path, kind) in entries {
            let segments: Vec<&str> = path
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            if segments.is_empty() {
                continue;
            }
            root.insert(&segments, kind);
        }
        root
    }

    fn insert(&mut self, segments: &[&str], kind: NodeKind) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let child_path = if self.path.is_empty() {
            (*first).to_string()
        } else {
            format!("{}/{}", self.path, first)
        };

        if rest.is_empty() {
            if self.children.iter().any(|c| c.path == child_path) {
                return;
            }
            self.children.push(Self {
                path: child_path,
                kind,
                children: Vec::new(),
            });
            return;
        }

        let index = match self
            .children
            .iter()
            .position(|c| c.path == child_path && c.is_directory())
        {
            Some(index) => index,
            None => {
                self.children.push(Self::directory(child_path, Vec::new()));
                self.children.len() - 1
            }
        };
        self.children[index].insert(rest, kind);
    }
}
