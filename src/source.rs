//! # Repository Sources
//!
//! A repository source lists a repository as a [`TreeNode`] and returns the
//! text of individual files. The aggregator only talks to this trait, so the
//! same pipeline runs against GitHub or a local checkout.
//!
//! ## Key Components
//!
//! - `RepositorySource`: the tree-fetching collaborator contract
//! - `GithubSource`: GitHub REST API implementation
//! - `LocalSource`: local directory implementation
//! - `SourceOptions`: readability limits shared by all sources
//!
//! A file is readable when it is valid UTF-8, contains no NUL bytes and is
//! no larger than `SourceOptions::max_file_bytes`. Anything else is reported
//! as an error for that single file.

pub mod error;
pub mod github;
pub mod local;

use std::future::Future;

pub use error::SourceError;
pub use github::GithubSource;
pub use local::LocalSource;

use crate::tree::TreeNode;

/// Default upper bound on a single file's size
pub const DEFAULT_MAX_FILE_BYTES: u64 = 512 * 1024;

/// Default number of file requests kept in flight during aggregation
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Tree-fetching collaborator
pub trait RepositorySource: Send + Sync {
    /// Human-readable identifier used in logs
    fn describe(&self) -> String;

    /// List the whole repository
    fn fetch_tree(&self) -> impl Future<Output = Result<TreeNode, SourceError>> + Send;

    /// Fetch the text content of one file by its repository-relative path
    fn fetch_file(&self, path: &str) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// Limits applied by every source
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Files larger than this are treated as unreadable
    pub max_file_bytes: u64,

    /// Directory names never descended into when listing a local tree
    pub ignored_dirs: Vec<String>,

    /// Number of file requests kept in flight during aggregation
    pub fetch_concurrency: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            ignored_dirs: vec![
                ".git".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
            ],
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl SourceOptions {
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }
}

/// Turn raw file bytes into text, rejecting oversized and binary content
pub fn decode_text(path: &str, bytes: Vec<u8>, max_file_bytes: u64) -> Result<String, SourceError> {
    let size = bytes.len() as u64;
    if size > max_file_bytes {
        return Err(SourceError::TooLarge {
            path: path.to_string(),
            size,
            limit: max_file_bytes,
        });
    }
    if bytes.contains(&0) {
        return Err(SourceError::Binary(path.to_string()));
    }
    String::from_utf8(bytes).map_err(|_| SourceError::Binary(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_accepts_utf8() {
        let text = decode_text("a.txt", "héllo".as_bytes().to_vec(), 1024).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn test_decode_text_rejects_nul_bytes() {
        let result = decode_text("img.png", vec![0x89, b'P', 0, b'G'], 1024);
        assert!(matches!(result, Err(SourceError::Binary(p)) if p == "img.png"));
    }

    #[test]
    fn test_decode_text_rejects_invalid_utf8() {
        let result = decode_text("blob.bin", vec![0xff, 0xfe, 0xfd], 1024);
        assert!(matches!(result, Err(SourceError::Binary(_))));
    }

    #[test]
    fn test_decode_text_rejects_oversized_files() {
        let result = decode_text("big.txt", vec![b'a'; 11], 10);
        assert!(matches!(
            result,
            Err(SourceError::TooLarge { size: 11, limit: 10, .. })
        ));
    }

    #[test]
    fn test_default_options_ignore_vcs_and_build_dirs() {
        let options = SourceOptions::default();
        assert!(options.is_ignored_dir(".git"));
        assert!(options.is_ignored_dir("target"));
        assert!(!options.is_ignored_dir("src"));
    }
}
