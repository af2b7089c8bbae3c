//! # Content Aggregation
//!
//! Walks a [`TreeNode`] depth-first and fetches the text of every file node
//! through a [`RepositorySource`]. Files that cannot be read are left out;
//! only errors that would affect every file (bad credentials, exhausted
//! quota) abort the whole pass.
//!
//! Requests are issued concurrently up to `SourceOptions::fetch_concurrency`
//! but results are always returned in traversal order.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::pin::pin;
use tracing::{info, instrument, warn};

use crate::source::{DEFAULT_FETCH_CONCURRENCY, RepositorySource, SourceError};
use crate::tree::TreeNode;

/// A file whose content was fetched successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFile {
    pub path: String,
    pub content: String,
}

impl FetchedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Result of one aggregation pass
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Readable files in traversal order
    pub files: Vec<FetchedFile>,

    /// Number of file nodes that could not be read
    pub skipped: usize,

    /// Number of repeated paths in the tree that were fetched only once
    pub duplicates: usize,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Fetch every readable file in `tree`
#[instrument(skip_all, fields(source = %source.describe()))]
pub async fn aggregate<S>(source: &S, tree: &TreeNode) -> Result<Aggregation, SourceError>
where
    S: RepositorySource + ?Sized,
{
    aggregate_with_concurrency(source, tree, DEFAULT_FETCH_CONCURRENCY).await
}

/// Fetch every readable file in `tree` with at most `concurrency` requests in flight
pub async fn aggregate_with_concurrency<S>(
    source: &S,
    tree: &TreeNode,
    concurrency: usize,
) -> Result<Aggregation, SourceError>
where
    S: RepositorySource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    let mut paths: Vec<String> = Vec::new();
    for node in tree.files() {
        if seen.insert(node.path.as_str()) {
            paths.push(node.path.clone());
        } else {
            duplicates += 1;
        }
    }

    let fetches = stream::iter(paths)
        .map(|path: String| async move {
            let result = source.fetch_file(&path).await;
            (path, result)
        })
        .buffered(concurrency.max(1));
    let mut fetches = pin!(fetches);

    let mut aggregation = Aggregation {
        duplicates,
        ..Aggregation::default()
    };
    while let Some((path, result)) = fetches.next().await {
        match result {
            Ok(content) => aggregation.files.push(FetchedFile::new(path, content)),
            Err(e) if e.is_fatal() => {
                warn!(path = %path, error = %e, "Aborting aggregation");
                return Err(e);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping unreadable file");
                aggregation.skipped += 1;
            }
        }
    }

    info!(
        files = aggregation.files.len(),
        skipped = aggregation.skipped,
        duplicates = aggregation.duplicates,
        "Aggregation finished"
    );
    Ok(aggregation)
}

/// Fetch every readable file in `tree`, discarding the skip count
pub async fn fetch_all_file_contents<S>(source: &S, tree: &TreeNode) -> Result<Vec<FetchedFile>, SourceError>
where
    S: RepositorySource + ?Sized,
{
    Ok(aggregate(source, tree).await?.files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory source that records which paths were requested
    struct MapSource {
        files: HashMap<String, Result<String, fn(&str) -> SourceError>>,
        requested: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn new() -> Self {
            Self {
                files: HashMap::new(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), Ok(content.to_string()));
            self
        }

        fn with_error(mut self, path: &str, make: fn(&str) -> SourceError) -> Self {
            self.files.insert(path.to_string(), Err(make));
            self
        }
    }

    impl RepositorySource for MapSource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        async fn fetch_tree(&self) -> Result<TreeNode, SourceError> {
            Ok(TreeNode::root())
        }

        async fn fetch_file(&self, path: &str) -> Result<String, SourceError> {
            self.requested.lock().unwrap().push(path.to_string());
            match self.files.get(path) {
                Some(Ok(content)) => Ok(content.clone()),
                Some(Err(make)) => Err(make(path)),
                None => Err(SourceError::NotFound(path.to_string())),
            }
        }
    }

    fn sample_tree() -> TreeNode {
        TreeNode::directory(
            "",
            vec![
                TreeNode::file("README.md"),
                TreeNode::directory(
                    "src",
                    vec![TreeNode::file("src/main.rs"), TreeNode::file("src/logo.png")],
                ),
                TreeNode::file("Cargo.toml"),
            ],
        )
    }

    #[tokio::test]
    async fn test_aggregate_keeps_traversal_order_and_skips_unreadable() {
        let source = MapSource::new()
            .with_file("README.md", "# Demo")
            .with_file("src/main.rs", "fn main() {}")
            .with_error("src/logo.png", |p| SourceError::Binary(p.to_string()))
            .with_file("Cargo.toml", "[package]");

        let aggregation = aggregate(&source, &sample_tree()).await.unwrap();
        let paths: Vec<&str> = aggregation.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src/main.rs", "Cargo.toml"]);
        assert_eq!(aggregation.skipped, 1);
        assert_eq!(aggregation.files[1].content, "fn main() {}");
    }

    #[tokio::test]
    async fn test_aggregate_requests_every_file_node_once() {
        let source = MapSource::new().with_file("README.md", "x");
        let _ = aggregate(&source, &sample_tree()).await.unwrap();

        let mut requested = source.requested.lock().unwrap().clone();
        requested.sort();
        assert_eq!(
            requested,
            vec!["Cargo.toml", "README.md", "src/logo.png", "src/main.rs"]
        );
    }

    #[tokio::test]
    async fn test_aggregate_tree_without_files_is_empty() {
        let source = MapSource::new();
        let tree = TreeNode::directory("", vec![TreeNode::directory("docs", vec![])]);

        let aggregation = aggregate(&source, &tree).await.unwrap();
        assert!(aggregation.is_empty());
        assert_eq!(aggregation.skipped, 0);
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_aborts_on_fatal_error() {
        let source = MapSource::new()
            .with_file("README.md", "# Demo")
            .with_error("src/main.rs", |_| SourceError::Auth("token revoked".into()));

        let result = aggregate(&source, &sample_tree()).await;
        assert!(matches!(result, Err(SourceError::Auth(_))));
    }

    fn rate_limited_tree(count: usize) -> (MapSource, TreeNode) {
        let mut source = MapSource::new();
        let mut children = Vec::with_capacity(count);
        for i in 0..count {
            let path = format!("file{i}.txt");
            source = source.with_error(&path, |_| SourceError::RateLimit { retry_after_secs: 60 });
            children.push(TreeNode::file(path));
        }
        (source, TreeNode::directory("", children))
    }

    #[tokio::test]
    async fn test_fatal_error_stops_further_requests() {
        let (source, tree) = rate_limited_tree(1000);

        let result = aggregate_with_concurrency(&source, &tree, 1).await;
        assert!(matches!(result, Err(SourceError::RateLimit { retry_after_secs: 60 })));
        assert_eq!(*source.requested.lock().unwrap(), vec!["file0.txt"]);
    }

    #[tokio::test]
    async fn test_fatal_error_requests_stay_within_concurrency() {
        let (source, tree) = rate_limited_tree(1000);

        let result = aggregate_with_concurrency(&source, &tree, 4).await;
        assert!(matches!(result, Err(SourceError::RateLimit { .. })));
        let requested = source.requested.lock().unwrap().len();
        assert!((1..=4).contains(&requested), "requested {requested} files");
    }

    #[tokio::test]
    async fn test_unreadable_count_excludes_duplicates() {
        let source = MapSource::new()
            .with_file("a.txt", "a")
            .with_error("b.bin", |p| SourceError::Binary(p.to_string()));
        let tree = TreeNode::directory(
            "",
            vec![
                TreeNode::file("a.txt"),
                TreeNode::file("b.bin"),
                TreeNode::file("a.txt"),
                TreeNode::file("b.bin"),
            ],
        );

        let aggregation = aggregate(&source, &tree).await.unwrap();
        assert_eq!(aggregation.files, vec![FetchedFile::new("a.txt", "a")]);
        assert_eq!(aggregation.skipped, 1);
        assert_eq!(aggregation.duplicates, 2);
    }

    #[tokio::test]
    async fn test_duplicate_paths_are_fetched_once() {
        let source = MapSource::new().with_file("a.txt", "a");
        let tree = TreeNode::directory("", vec![TreeNode::file("a.txt"), TreeNode::file("a.txt")]);

        let aggregation = aggregate_with_concurrency(&source, &tree, 1).await.unwrap();
        assert_eq!(aggregation.files.len(), 1);
        assert_eq!(aggregation.skipped, 0);
        assert_eq!(aggregation.duplicates, 1);
        assert_eq!(source.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_file_contents_returns_files_only() {
        let source = MapSource::new().with_file("Cargo.toml", "[package]");
        let files = fetch_all_file_contents(&source, &sample_tree()).await.unwrap();
        assert_eq!(files, vec![FetchedFile::new("Cargo.toml", "[package]")]);
    }
}
