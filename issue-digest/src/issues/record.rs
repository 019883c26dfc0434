//! Cached issue record.

use super::{IssueState, Label};
use serde::{Deserialize, Serialize};

/// One open issue of a repository, normalized from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Globally unique GitHub id.
    pub id: u64,

    /// Issue number within the repository.
    pub number: u64,

    /// Owning repository in "owner/name" format.
    pub repo: String,

    pub title: String,

    pub body: Option<String>,

    pub html_url: String,

    pub state: IssueState,

    /// ISO-8601 timestamp, verbatim from GitHub.
    pub created_at: String,

    /// ISO-8601 timestamp, verbatim from GitHub.
    pub updated_at: String,

    /// Author login; `None` when GitHub reports no user (e.g., deleted accounts).
    pub author_login: Option<String>,

    pub labels: Vec<Label>,

    /// Assignee logins in GitHub's order.
    pub assignees: Vec<String>,

    /// Number of comments.
    pub comments: u32,
}

impl IssueRecord {
    /// Returns the label names in their original order.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }
}
