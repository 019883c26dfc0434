//! Column encoding for cached issues.

use super::CacheError;
use crate::issues::{IssueRecord, IssueState, Label};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;

/// Columns written per issue row, in insert order.
pub(super) const ISSUE_COLUMNS: [&str; 13] = [
    "repo",
    "id",
    "number",
    "title",
    "body",
    "html_url",
    "state",
    "created_at",
    "updated_at",
    "author_login",
    "labels",
    "comments",
    "assignees",
];

impl ToSql for IssueState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for IssueState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown issue state '{text}'").into()))
    }
}

/// An issue with its list columns already encoded as JSON text.
pub(super) struct EncodedIssue<'a> {
    pub issue: &'a IssueRecord,
    pub labels: String,
    pub assignees: String,
}

impl<'a> EncodedIssue<'a> {
    /// Encodes the list columns of `issue`.
    pub fn new(issue: &'a IssueRecord) -> Result<Self, CacheError> {
        let labels = serde_json::to_string(&issue.labels).map_err(|source| CacheError::Encode {
            field: "labels",
            id: issue.id,
            source,
        })?;
        let assignees =
            serde_json::to_string(&issue.assignees).map_err(|source| CacheError::Encode {
                field: "assignees",
                id: issue.id,
                source,
            })?;

        Ok(Self {
            issue,
            labels,
            assignees,
        })
    }

    /// Bound parameters for one row, in [`ISSUE_COLUMNS`] order.
    pub fn params<'p>(&'p self, repo: &'p dyn ToSql) -> [&'p dyn ToSql; 13] {
        let issue = self.issue;
        [
            repo,
            &issue.id,
            &issue.number,
            &issue.title,
            &issue.body,
            &issue.html_url,
            &issue.state,
            &issue.created_at,
            &issue.updated_at,
            &issue.author_login,
            &self.labels,
            &issue.comments,
            &self.assignees,
        ]
    }
}

/// Reads an issue from a row selected with [`ISSUE_COLUMNS`].
pub(super) fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<IssueRecord> {
    let labels: Vec<Label> = decode_json(row, 10)?;
    let assignees: Vec<String> = decode_json(row, 12)?;

    Ok(IssueRecord {
        repo: row.get(0)?,
        id: row.get(1)?,
        number: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        html_url: row.get(5)?,
        state: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        author_login: row.get(9)?,
        labels,
        comments: row.get(11)?,
        assignees,
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
