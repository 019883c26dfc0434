//! Issue payloads as returned by the GitHub "list repository issues" endpoint.

use super::RepoName;
use crate::issues::{IssueRecord, IssueState, Label};
use serde::Deserialize;

/// An item from `GET /repos/{owner}/{repo}/issues`.
///
/// Only the fields the cache keeps are decoded. The endpoint also returns
/// pull requests; those carry a `pull_request` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub state: IssueState,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub assignees: Vec<ApiUser>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

/// A user reference (author or assignee).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

/// A label reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl ApiIssue {
    /// Returns true if this item is a pull request rather than an issue.
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Normalizes this payload into an [`IssueRecord`] owned by `repo`.
    #[must_use]
    pub fn into_record(self, repo: &RepoName) -> IssueRecord {
        IssueRecord {
            id: self.id,
            number: self.number,
            repo: repo.full_name(),
            title: self.title,
            body: self.body,
            html_url: self.html_url,
            state: self.state,
            created_at: self.created_at,
            updated_at: self.updated_at,
            author_login: self
                .user
                .map(|user| user.login)
                .filter(|login| !login.is_empty()),
            labels: self
                .labels
                .into_iter()
                .map(|label| Label::new(label.name, label.color))
                .collect(),
            assignees: self
                .assignees
                .into_iter()
                .map(|assignee| assignee.login)
                .collect(),
            comments: self.comments,
        }
    }
}
