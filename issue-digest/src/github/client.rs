//! Octocrab-backed issue page source.

use super::{classify_status, ApiIssue, IssuePageSource, RepoName, UpstreamError, PER_PAGE};
use crate::config::GitHubConfig;
use crate::rate_limit::check_core_rate_limit;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Query parameters for the "list repository issues" endpoint.
#[derive(Debug, Serialize)]
struct ListIssuesParams {
    state: &'static str,
    per_page: u8,
    page: u32,
    sort: &'static str,
    direction: &'static str,
}

/// Fetches issue pages from the GitHub REST API.
///
/// Retries are disabled on the underlying client: every failure is reported
/// to the caller as-is.
#[derive(Clone)]
pub struct GitHubIssues {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubIssues {
    /// Builds a client from configuration.
    ///
    /// The token is optional; anonymous access works with a lower rate limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid or the client cannot
    /// be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        if let Some(token) = &config.token {
            builder = builder.personal_token(token.clone());
        }
        if let Some(api_base) = &config.api_base {
            builder = builder.base_uri(api_base.as_str())?;
        }

        Ok(Self::from_octocrab(
            builder.build()?,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    /// Wraps an existing octocrab client.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }

    /// Returns the underlying octocrab client.
    #[must_use]
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }

    /// Converts an octocrab failure into an [`UpstreamError`].
    ///
    /// For 403 responses the core quota is read so that exhaustion can be
    /// told apart from a permission denial.
    async fn upstream_error(&self, repo: &RepoName, error: octocrab::Error) -> UpstreamError {
        let (status, message) = match error {
            octocrab::Error::GitHub { source, .. } => {
                (source.status_code.as_u16(), source.message.clone())
            }
            other => return UpstreamError::GitHubError(other),
        };

        let rate_limit_remaining = if status == 403 {
            self.remaining_core_quota().await
        } else {
            None
        };

        UpstreamError::Status {
            repo: repo.full_name(),
            kind: classify_status(status, &message, rate_limit_remaining),
            status,
            rate_limit_remaining,
            message,
        }
    }

    async fn remaining_core_quota(&self) -> Option<u32> {
        match tokio::time::timeout(self.timeout, check_core_rate_limit(&self.octocrab)).await {
            Ok(Ok(info)) => Some(info.remaining),
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read rate limit after 403");
                None
            }
            Err(_) => {
                warn!("Timed out reading rate limit after 403");
                None
            }
        }
    }
}

impl IssuePageSource for GitHubIssues {
    async fn list_open_issues(
        &self,
        repo: &RepoName,
        page: u32,
    ) -> Result<Vec<ApiIssue>, UpstreamError> {
        let route = format!("/repos/{}/{}/issues", repo.owner(), repo.name());
        let params = ListIssuesParams {
            state: "open",
            per_page: PER_PAGE,
            page,
            sort: "created",
            direction: "desc",
        };
        debug!(route = %route, page, "Requesting issue page");

        let request = self.octocrab.get::<Vec<ApiIssue>, _, _>(route, Some(&params));
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(items)) => Ok(items),
            Ok(Err(e)) => Err(self.upstream_error(repo, e).await),
            Err(_) => Err(UpstreamError::Timeout {
                repo: repo.full_name(),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}
