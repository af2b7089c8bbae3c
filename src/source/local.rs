//! Local directory source

use futures::future::{BoxFuture, FutureExt};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

use super::{RepositorySource, SourceError, SourceOptions, decode_text};
use crate::tree::TreeNode;

/// Repository source reading a checkout on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    options: SourceOptions,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: SourceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository-relative path, refusing anything that escapes the root
    fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SourceError::Other(format!("Path escapes repository root: {}", path)));
        }
        Ok(self.root.join(relative))
    }

    fn walk<'a>(&'a self, dir: PathBuf, prefix: String) -> BoxFuture<'a, Result<Vec<TreeNode>, SourceError>> {
        async move {
            let mut entries = Vec::new();
            let mut read_dir = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                entries.push(entry);
            }
            entries.sort_by_key(|e| e.file_name());

            let mut nodes = Vec::with_capacity(entries.len());
            for entry in entries {
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    if self.options.is_ignored_dir(&name) {
                        debug!(path = %path, "Skipping ignored directory");
                        continue;
                    }
                    let children = self.walk(entry.path(), path.clone()).await?;
                    nodes.push(TreeNode::directory(path, children));
                } else if file_type.is_file() {
                    nodes.push(TreeNode::file(path));
                }
            }
            Ok(nodes)
        }
        .boxed()
    }
}

impl RepositorySource for LocalSource {
    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }

    #[instrument(skip(self), fields(root = %self.root.display()), level = "debug")]
    async fn fetch_tree(&self) -> Result<TreeNode, SourceError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Err(SourceError::NotFound(self.root.display().to_string())),
        }
        let children = self.walk(self.root.clone(), String::new()).await?;
        Ok(TreeNode::directory("", children))
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_file(&self, path: &str) -> Result<String, SourceError> {
        let full_path = self.resolve(path)?;
        let metadata = match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(path.to_string()));
            }
            Err(e) => return Err(SourceError::Io(e)),
        };
        if metadata.len() > self.options.max_file_bytes {
            return Err(SourceError::TooLarge {
                path: path.to_string(),
                size: metadata.len(),
                limit: self.options.max_file_bytes,
            });
        }
        let bytes = tokio::fs::read(&full_path).await?;
        decode_text(path, bytes, self.options.max_file_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_fetch_tree_sorts_entries_and_skips_ignored_dirs() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "deep").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        fs::write(root.join("target/debug/out"), "bin").unwrap();

        let tree = LocalSource::new(root).fetch_tree().await.unwrap();
        let files: Vec<&str> = tree.files().iter().map(|n| n.path.as_str()).collect();
        assert_eq!(files, vec!["a.txt", "b.txt", "src/nested/deep.rs"]);
    }

    #[tokio::test]
    async fn test_fetch_file_reads_text() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/guide.md"), "# Guide\n").unwrap();

        let content = LocalSource::new(tmp.path()).fetch_file("docs/guide.md").await.unwrap();
        assert_eq!(content, "# Guide\n");
    }

    #[tokio::test]
    async fn test_fetch_file_rejects_parent_traversal() {
        let tmp = tempdir().unwrap();
        let result = LocalSource::new(tmp.path()).fetch_file("../etc/passwd").await;
        assert!(matches!(result, Err(SourceError::Other(_))));
    }

    #[tokio::test]
    async fn test_fetch_file_enforces_size_limit() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("big.txt"), "0123456789").unwrap();
        let options = SourceOptions {
            max_file_bytes: 4,
            ..SourceOptions::default()
        };

        let result = LocalSource::new(tmp.path())
            .with_options(options)
            .fetch_file("big.txt")
            .await;
        assert!(matches!(result, Err(SourceError::TooLarge { size: 10, limit: 4, .. })));
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let tmp = tempdir().unwrap();
        let result = LocalSource::new(tmp.path().join("nope")).fetch_tree().await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_root_that_is_a_file_is_not_found() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("README.md");
        fs::write(&file, "# Demo").unwrap();

        let err = assert_err!(LocalSource::new(&file).fetch_tree().await);
        assert!(matches!(err, SourceError::NotFound(p) if p.ends_with("README.md")));
    }

    #[tokio::test]
    async fn test_binary_files_are_unreadable() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap();
        fs::write(tmp.path().join("notes.txt"), "plain").unwrap();
        let source = LocalSource::new(tmp.path());

        assert_ok!(source.fetch_file("notes.txt").await);
        let err = assert_err!(source.fetch_file("logo.png").await);
        assert!(matches!(err, SourceError::Binary(_)));
    }
}
