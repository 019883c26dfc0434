#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod analysis;
pub mod cache;
pub mod config;
pub mod github;
pub mod issues;
pub mod llm;
pub mod rate_limit;
pub mod runner;
pub mod summary;

pub use analysis::{plan_chunks, Analyzer, AnalyzerSettings};
pub use cache::{CacheError, IssueCache, ScanRecord};
pub use config::{AnalysisConfig, CacheConfig, Config, ConfigError, GitHubConfig, LlmConfig};
pub use github::{
    fetch_open_issues, is_valid_repo_format, GitHubIssues, IssuePageSource, RepoName,
    UpstreamError, UpstreamErrorKind,
};
pub use issues::{IssueRecord, IssueState, Label};
pub use llm::{CompletionModel, CompletionRequest, GeminiClient, LlmError, LlmErrorKind};
pub use rate_limit::{check_core_rate_limit, RateLimitInfo};
pub use runner::{Runner, RunnerError};
pub use summary::{AnalysisOutcome, CacheStatus, ScanSummary};
