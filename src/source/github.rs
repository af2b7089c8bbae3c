//! GitHub tree source
//!
//! Lists a repository through the git trees API and fetches file contents
//! through the contents API using the raw media type.

use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::{RepositorySource, SourceError, SourceOptions, decode_text};
use crate::tree::{NodeKind, TreeNode};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Public GitHub REST endpoint
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Retry hint used when GitHub does not send one
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Repository source backed by the GitHub REST API
#[derive(Clone)]
pub struct GithubSource {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// Optional personal access token
    token: Option<String>,

    owner: String,
    repo: String,

    /// Branch, tag or commit; `HEAD` when unset
    reference: String,

    options: SourceOptions,
}

impl GithubSource {
    /// Create an unauthenticated source for `owner/repo` at `HEAD`
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, SourceError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("repoview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            owner: owner.into(),
            repo: repo.into(),
            reference: "HEAD".to_string(),
            options: SourceOptions::default(),
        })
    }

    /// Create a source using `GITHUB_TOKEN` from the environment when present
    pub fn from_env(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, SourceError> {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        Ok(Self::new(owner, repo)?.with_token(token))
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Point the source at a different API host (GitHub Enterprise, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Other(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and map non-success statuses to source errors
    async fn execute_request(&self, request: RequestBuilder, what: &str) -> Result<Response, SourceError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, what, "GitHub API error: {}", body);

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimit { retry_after_secs },
            StatusCode::FORBIDDEN if rate_limited => SourceError::RateLimit { retry_after_secs },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SourceError::Auth("Invalid or insufficient GitHub credentials".to_string())
            }
            StatusCode::NOT_FOUND => SourceError::NotFound(what.to_string()),
            _ => SourceError::Api {
                status_code: status.as_u16(),
                message: body,
            },
        })
    }
}

impl RepositorySource for GithubSource {
    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.owner, self.repo, self.reference)
    }

    #[instrument(skip(self), fields(repo = %self.describe()), level = "debug")]
    async fn fetch_tree(&self) -> Result<TreeNode, SourceError> {
        let mut url = self.build_url(&["repos", &self.owner, &self.repo, "git", "trees", &self.reference])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let request = self
            .authorize(self.client.get(url))
            .header("Accept", "application/vnd.github+json");

        debug!("Listing repository tree");
        let response = self.execute_request(request, &self.describe()).await?;
        let text = response.text().await?;
        let listing: TreeResponse = serde_json::from_str(&text)
            .inspect_err(|e| error!("Failed to parse tree response: {}", e))?;

        if listing.truncated {
            warn!(entries = listing.tree.len(), "GitHub truncated the tree listing");
        }

        // Submodules ("commit" entries) have no content to fetch.
        let entries = listing.tree.into_iter().filter_map(|entry| match entry.kind.as_str() {
            "blob" => Some((entry.path, NodeKind::File)),
            "tree" => Some((entry.path, NodeKind::Directory)),
            _ => None,
        });
        Ok(TreeNode::from_entries(entries))
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_file(&self, path: &str) -> Result<String, SourceError> {
        let mut segments = vec!["repos", self.owner.as_str(), self.repo.as_str(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.build_url(&segments)?;
        url.query_pairs_mut().append_pair("ref", &self.reference);

        let request = self
            .authorize(self.client.get(url))
            .header("Accept", "application/vnd.github.raw");

        let response = self.execute_request(request, path).await?;
        let bytes = response.bytes().await?;
        decode_text(path, bytes.to_vec(), self.options.max_file_bytes)
    }
}
