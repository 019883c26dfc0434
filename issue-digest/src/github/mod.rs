//! Open issue retrieval from GitHub.
//!
//! This module pages through a repository's open issues, drops pull
//! requests (the issues endpoint returns both) and normalizes the survivors
//! into [`IssueRecord`]s.

mod api_issue;
mod client;
mod error;
mod repository;

pub use api_issue::{ApiIssue, ApiLabel, ApiUser};
pub use client::GitHubIssues;
pub use error::{UpstreamError, UpstreamErrorKind};
pub use repository::{is_valid_repo_format, RepoName};

pub(crate) use error::classify_status;

use crate::issues::IssueRecord;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, info_span, Instrument};

/// Items requested per page (the API maximum).
pub const PER_PAGE: u8 = 100;

/// A source of open-issue pages for a repository.
///
/// Implemented by [`GitHubIssues`] for the real API; tests substitute fakes.
pub trait IssuePageSource: Send + Sync {
    /// Fetches one page (1-based) of open issues, newest first, at most
    /// [`PER_PAGE`] items. May include pull requests.
    fn list_open_issues(
        &self,
        repo: &RepoName,
        page: u32,
    ) -> impl Future<Output = Result<Vec<ApiIssue>, UpstreamError>> + Send;
}

/// Fetches all open issues (excluding pull requests) of a repository.
///
/// Pages are requested sequentially until a page comes back with fewer than
/// [`PER_PAGE`] items. Any failure aborts the whole fetch; no partial result
/// is returned and nothing is retried.
///
/// # Arguments
///
/// * `source` - Page source (usually [`GitHubIssues`])
/// * `repo` - Repository in "owner/name" format
///
/// # Errors
///
/// Returns [`UpstreamError::InvalidFormat`] before any request if `repo` is
/// malformed, or the first page failure otherwise.
pub async fn fetch_open_issues<S: IssuePageSource>(
    source: &S,
    repo: &str,
) -> Result<Vec<IssueRecord>, UpstreamError> {
    let repo = RepoName::parse(repo)?;
    let span = info_span!("fetch_issues", repo = %repo);

    async {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;

        loop {
            let items = source.list_open_issues(&repo, page).await?;
            let fetched = items.len();

            for item in items {
                // Issues opened mid-scan shift older ones onto the next page.
                if item.is_pull_request() || !seen.insert(item.id) {
                    continue;
                }
                issues.push(item.into_record(&repo));
            }

            debug!(page, fetched, total = issues.len(), "Fetched issue page");
            if fetched < usize::from(PER_PAGE) {
                break;
            }
            page += 1;
        }

        info!(count = issues.len(), pages = page, "Fetched open issues");
        Ok(issues)
    }
    .instrument(span)
    .await
}
