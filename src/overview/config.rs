//! # Overview Configuration
//!
//! Settings for one overview run: which model to ask, what preamble to give
//! it, and the readability limits applied while aggregating.

use crate::generator::DEFAULT_PREAMBLE;
use crate::model::DEFAULT_MODEL;
use crate::source::SourceOptions;

/// Configuration for overview generation
#[derive(Debug, Clone)]
pub struct OverviewConfig {
    /// Completion model name
    pub model: String,

    /// Instructions sent ahead of the repository document
    pub preamble: String,

    /// Limits for listing and reading files
    pub source_options: SourceOptions,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            source_options: SourceOptions::default(),
        }
    }
}

impl OverviewConfig {
    /// Create a new builder
    pub fn builder() -> OverviewConfigBuilder {
        OverviewConfigBuilder::new()
    }
}

/// Builder for OverviewConfig
#[derive(Debug, Default)]
pub struct OverviewConfigBuilder {
    config: OverviewConfig,
}

impl OverviewConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: OverviewConfig::default(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.config.preamble = preamble.into();
        self
    }

    pub fn source_options(mut self, source_options: SourceOptions) -> Self {
        self.config.source_options = source_options;
        self
    }

    /// Set the largest file size still treated as readable
    pub fn max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.config.source_options.max_file_bytes = max_file_bytes;
        self
    }

    /// Add a directory name to skip when listing local trees
    pub fn ignore_dir(mut self, name: impl Into<String>) -> Self {
        self.config.source_options.ignored_dirs.push(name.into());
        self
    }

    /// Set how many file requests may be in flight at once
    pub fn fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.config.source_options.fetch_concurrency = fetch_concurrency;
        self
    }

    pub fn build(self) -> OverviewConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = OverviewConfig::builder()
            .model("gemini-2.0-flash-lite")
            .max_file_bytes(1024)
            .ignore_dir("dist")
            .fetch_concurrency(2)
            .build();

        assert_eq!(config.model, "gemini-2.0-flash-lite");
        assert_eq!(config.preamble, DEFAULT_PREAMBLE);
        assert_eq!(config.source_options.max_file_bytes, 1024);
        assert!(config.source_options.is_ignored_dir("dist"));
        assert!(config.source_options.is_ignored_dir(".git"));
        assert_eq!(config.source_options.fetch_concurrency, 2);
    }
}
