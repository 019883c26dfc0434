//! Non-LLM configuration sections.

use serde::Deserialize;
use std::path::PathBuf;

/// `[github]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Token sent as a bearer credential (optional; anonymous otherwise).
    pub token: Option<String>,

    /// API base URL, for GitHub Enterprise (optional).
    pub api_base: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: None,
            timeout_secs: 30,
        }
    }
}

/// `[analysis]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Largest issue set sent in one call; larger sets are chunked.
    pub max_issues_per_chunk: usize,

    /// Characters of each issue body included in prompts (0 omits bodies).
    pub max_body_length: usize,

    /// Batch summaries allowed in flight at once.
    pub chunk_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_issues_per_chunk: 50,
            max_body_length: 0,
            chunk_concurrency: 1,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("issues.db"),
        }
    }
}
