//! Runner error types.

/// Errors that can occur while scanning or analyzing a repository.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading or validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub fetch errors.
    #[error(transparent)]
    Upstream(#[from] crate::github::UpstreamError),

    /// Issue cache errors.
    #[error(transparent)]
    Cache(#[from] crate::cache::CacheError),

    /// LLM errors.
    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Analysis was requested for a repository that was never scanned.
    #[error("Repository '{repo}' has not been scanned yet; run a scan first")]
    NotScanned { repo: String },

    /// Analysis was requested without a prompt.
    #[error("Missing analysis prompt")]
    MissingPrompt,
}

impl RunnerError {
    /// Returns true for failures of the local setup (configuration, cache,
    /// client construction) rather than of a single request.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Cache(_) | Self::Octocrab(_))
    }
}
