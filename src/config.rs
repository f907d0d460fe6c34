//! Engine Configuration
//!
//! Limits and fan-out settings for the document engine. Every field has a
//! default, so an empty JSON object is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{DocsError, DocsResult};
use crate::path::{MAX_ENCODABLE_INDEX, MAX_SUPPORTED_DEPTH};

/// Document engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Number of segment columns in the table (default: 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Longest array a document may contain (default: 1_000_000)
    #[serde(default = "default_max_array_length")]
    pub max_array_length: usize,

    /// Documents per search page when the caller gives none (default: 100)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound for a caller-supplied page size (default: 1000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// In-flight row-store queries per request (default: 8)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Rows requested per row-store page during scans (default: 1000)
    #[serde(default = "default_store_page_size")]
    pub store_page_size: usize,
}

fn default_max_depth() -> usize {
    MAX_SUPPORTED_DEPTH
}

fn default_max_array_length() -> usize {
    MAX_ENCODABLE_INDEX as usize + 1
}

fn default_page_size() -> usize {
    100
}

fn default_max_page_size() -> usize {
    1000
}

fn default_max_concurrency() -> usize {
    8
}

fn default_store_page_size() -> usize {
    1000
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_array_length: default_max_array_length(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_concurrency: default_max_concurrency(),
            store_page_size: default_store_page_size(),
        }
    }
}

impl DocsConfig {
    /// Create a config with the given segment column count
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(raw: &str) -> DocsResult<Self> {
        let config: DocsConfig = serde_json::from_str(raw)
            .map_err(|e| DocsError::invalid_document(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> DocsResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            DocsError::invalid_document(format!("config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject settings the row encoding cannot honor
    pub fn validate(&self) -> DocsResult<()> {
        if self.max_depth == 0 || self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(DocsError::invalid_document(format!(
                "config: max_depth must be in 1..={}",
                MAX_SUPPORTED_DEPTH
            )));
        }
        if self.max_array_length > MAX_ENCODABLE_INDEX as usize + 1 {
            return Err(DocsError::invalid_document(format!(
                "config: max_array_length cannot exceed {}",
                MAX_ENCODABLE_INDEX as usize + 1
            )));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 || self.store_page_size == 0 {
            return Err(DocsError::invalid_document(
                "config: page sizes must be positive",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(DocsError::invalid_document(
                "config: max_concurrency must be positive",
            ));
        }
        Ok(())
    }

    /// Resolve a caller page size against the configured bounds
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(0) | None => self.default_page_size,
            Some(n) => n.min(self.max_page_size),
        }
    }
}
