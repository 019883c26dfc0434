//! Scan and analysis orchestration.

mod error;

pub use error::RunnerError;

use crate::analysis::{Analyzer, AnalyzerSettings};
use crate::cache::IssueCache;
use crate::config::Config;
use crate::github::{fetch_open_issues, GitHubIssues, IssuePageSource, RepoName};
use crate::llm::{CompletionModel, GeminiClient, LlmError};
use crate::rate_limit::{check_core_rate_limit, RateLimitInfo};
use crate::summary::{AnalysisOutcome, CacheStatus, ScanSummary};
use tracing::{info, info_span, warn, Instrument};

/// Owns the GitHub client, issue cache and analyzer for the whole process.
pub struct Runner<S = GitHubIssues, M = GeminiClient> {
    source: S,
    cache: IssueCache,
    analyzer: Option<Analyzer<M>>,
}

impl Runner {
    /// Builds a runner from validated configuration.
    ///
    /// Without an LLM API key the runner can still scan; analysis then fails
    /// with [`LlmError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the GitHub client
    /// cannot be built, or the cache cannot be opened.
    pub fn new(config: &Config) -> Result<Self, RunnerError> {
        config.validate()?;
        let source = GitHubIssues::new(&config.github)?;
        let cache = IssueCache::open(&config.cache.path)?;

        let analyzer = match GeminiClient::new(&config.llm) {
            Ok(client) => Some(Analyzer::new(client, AnalyzerSettings::from_config(config))),
            Err(LlmError::MissingApiKey) => {
                warn!("No LLM API key configured; analysis is unavailable");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            source,
            cache,
            analyzer,
        })
    }
}

impl<M> Runner<GitHubIssues, M> {
    /// Reads the remaining GitHub core API quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limit endpoint cannot be reached.
    pub async fn rate_limit(&self) -> Result<RateLimitInfo, RunnerError> {
        Ok(check_core_rate_limit(self.source.octocrab()).await?)
    }
}

impl<S: IssuePageSource, M: CompletionModel> Runner<S, M> {
    /// Assembles a runner from already-built parts.
    #[must_use]
    pub fn from_parts(source: S, cache: IssueCache, analyzer: Analyzer<M>) -> Self {
        Self {
            source,
            cache,
            analyzer: Some(analyzer),
        }
    }

    /// Returns the issue cache.
    #[must_use]
    pub fn cache(&self) -> &IssueCache {
        &self.cache
    }

    /// Returns the analyzer, if an LLM is configured.
    #[must_use]
    pub fn analyzer(&self) -> Option<&Analyzer<M>> {
        self.analyzer.as_ref()
    }

    /// Returns the issue page source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches every open issue of `repo` and replaces its cached set.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch or the cache write fails. The
    /// previously cached set is then left as it was.
    pub async fn scan(&self, repo: &str) -> Result<ScanSummary, RunnerError> {
        let span = info_span!("scan", repo);

        async {
            info!("Scanning repository");
            let issues = fetch_open_issues(&self.source, repo).await?;
            let stored = self.cache.save_issues(repo, &issues)?;

            info!(issues = stored, "Scan complete");
            Ok(ScanSummary {
                repo: repo.to_string(),
                issues_fetched: stored,
                cached_successfully: true,
            })
        }
        .instrument(span)
        .await
    }

    /// Analyzes the cached issues of `repo` according to `prompt`.
    ///
    /// A repository scanned with no open issues gets a fixed answer without
    /// calling the LLM.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::MissingPrompt`] for a blank prompt,
    /// [`RunnerError::NotScanned`] if `repo` was never scanned, or the
    /// first LLM failure.
    pub async fn analyze(
        &self,
        repo: &str,
        prompt: &str,
    ) -> Result<AnalysisOutcome, RunnerError> {
        RepoName::parse(repo)?;
        if prompt.trim().is_empty() {
            return Err(RunnerError::MissingPrompt);
        }

        let issues = self.cache.get_issues(repo)?;
        if issues.is_empty() {
            if self.cache.last_scan(repo)?.is_none() {
                return Err(RunnerError::NotScanned {
                    repo: repo.to_string(),
                });
            }
            info!(repo, "No open issues to analyze");
            return Ok(AnalysisOutcome::no_open_issues(repo));
        }

        let analyzer = self.require_analyzer()?;
        let analysis = analyzer.analyze(&issues, prompt).await?;

        info!(repo, issues = issues.len(), "Analysis complete");
        Ok(AnalysisOutcome {
            repo: repo.to_string(),
            issues_analyzed: issues.len(),
            llm_calls: analyzer.planned_calls(issues.len()),
            analysis,
        })
    }

    /// Reports what the cache holds for `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be queried.
    pub fn status(&self, repo: &str) -> Result<CacheStatus, RunnerError> {
        Ok(CacheStatus {
            repo: repo.to_string(),
            issue_count: self.cache.issue_count(repo)?,
            last_scan: self.cache.last_scan(repo)?,
        })
    }

    /// Sends a trivial prompt to verify the LLM is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the call fails.
    pub async fn check_llm(&self) -> Result<(), RunnerError> {
        Ok(self.require_analyzer()?.check_connection().await?)
    }

    fn require_analyzer(&self) -> Result<&Analyzer<M>, LlmError> {
        self.analyzer.as_ref().ok_or(LlmError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{ApiIssue, UpstreamError};
    use crate::llm::CompletionRequest;

    struct NoIssues;

    impl IssuePageSource for NoIssues {
        async fn list_open_issues(
            &self,
            _repo: &RepoName,
            _page: u32,
        ) -> Result<Vec<ApiIssue>, UpstreamError> {
            Ok(Vec::new())
        }
    }

    struct Unreachable;

    impl CompletionModel for Unreachable {
        async fn generate(&self, _request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            panic!("the LLM must not be called");
        }
    }

    fn runner() -> Runner<NoIssues, Unreachable> {
        Runner::from_parts(
            NoIssues,
            IssueCache::open_in_memory().unwrap(),
            Analyzer::new(Unreachable, AnalyzerSettings::default()),
        )
    }

    #[tokio::test]
    async fn analyze_requires_prompt() {
        let error = runner().analyze("octo/demo", "   ").await.unwrap_err();
        assert!(matches!(error, RunnerError::MissingPrompt));
    }

    #[tokio::test]
    async fn analyze_rejects_invalid_repo() {
        let error = runner().analyze("not-a-valid-id", "Why?").await.unwrap_err();
        assert!(matches!(
            error,
            RunnerError::Upstream(UpstreamError::InvalidFormat { .. })
        ));
    }

    #[tokio::test]
    async fn analyze_before_scan_is_not_scanned() {
        let error = runner().analyze("never/scanned", "Why?").await.unwrap_err();

        assert!(matches!(error, RunnerError::NotScanned { ref repo } if repo == "never/scanned"));
        assert!(!error.is_critical());
    }

    #[tokio::test]
    async fn scanned_empty_repo_gets_fixed_answer_without_llm() {
        let runner = runner();

        let summary = runner.scan("octo/quiet").await.unwrap();
        let outcome = runner.analyze("octo/quiet", "Why?").await.unwrap();

        assert_eq!(summary.issues_fetched, 0);
        assert!(summary.cached_successfully);
        assert_eq!(outcome, AnalysisOutcome::no_open_issues("octo/quiet"));
        assert!(runner.status("octo/quiet").unwrap().is_scanned());
    }

    #[test]
    fn critical_errors() {
        assert!(RunnerError::Cache(crate::cache::CacheError::Poisoned).is_critical());
        assert!(!RunnerError::MissingPrompt.is_critical());
        assert!(!RunnerError::Llm(LlmError::MissingApiKey).is_critical());
    }
}
