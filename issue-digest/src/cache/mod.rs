//! SQLite-backed issue cache.
//!
//! Each repository owns one set of cached issues. A scan replaces the whole
//! set in a single transaction, so readers see either the previous set or
//! the new one.

mod error;
mod row;
mod scan;
mod schema;

pub use error::CacheError;
pub use scan::ScanRecord;
pub use schema::apply_schema;

use crate::issues::IssueRecord;
use chrono::{SecondsFormat, Utc};
use row::{issue_from_row, EncodedIssue, ISSUE_COLUMNS};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on bound parameters per statement (SQLite's historical
/// `SQLITE_MAX_VARIABLE_NUMBER`).
const MAX_BOUND_PARAMS: usize = 999;

/// Rows per multi-row `INSERT`.
const ROWS_PER_INSERT: usize = MAX_BOUND_PARAMS / ISSUE_COLUMNS.len();

/// Rows between progress messages while saving.
const PROGRESS_EVERY: usize = 2000;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent per-repository issue cache.
#[derive(Debug)]
pub struct IssueCache {
    conn: Mutex<Connection>,
}

impl IssueCache {
    /// Opens (or creates) the cache database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Open`] if the file cannot be opened, or
    /// [`CacheError::Sqlite`] if the schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|source| CacheError::Open {
            path: path.display().to_string(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_schema(&conn)?;

        info!(path = %path.display(), "Opened issue cache");
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Replaces every cached issue of `repo` with `issues`.
    ///
    /// Issues are stored under `repo` regardless of their own `repo` field.
    /// The scan marker for `repo` is updated in the same transaction.
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository in "owner/name" format
    /// * `issues` - The new issue set, in the order it should be returned
    ///
    /// # Returns
    ///
    /// The number of issues stored (0 for an empty set).
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any statement fails; the previous set
    /// is then left untouched.
    pub fn save_issues(&self, repo: &str, issues: &[IssueRecord]) -> Result<usize, CacheError> {
        let encoded = issues
            .iter()
            .map(EncodedIssue::new)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute("DELETE FROM issues WHERE repo = ?1", params![repo])?;
        debug!(repo, removed, "Cleared cached issues");

        let repo_param: &dyn ToSql = &repo;
        let mut inserted = 0;
        for batch in encoded.chunks(ROWS_PER_INSERT) {
            let sql = insert_sql(batch.len());
            let values: Vec<&dyn ToSql> = batch
                .iter()
                .flat_map(|row| row.params(repo_param))
                .collect();
            inserted += tx.execute(&sql, params_from_iter(values))?;

            if inserted / PROGRESS_EVERY > (inserted - batch.len()) / PROGRESS_EVERY {
                debug!(repo, inserted, total = issues.len(), "Caching issues");
            }
        }

        tx.execute(
            "INSERT INTO scans (repo, scanned_at, issue_count) VALUES (?1, ?2, ?3)
             ON CONFLICT(repo) DO UPDATE SET
                 scanned_at = excluded.scanned_at,
                 issue_count = excluded.issue_count",
            params![
                repo,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                inserted
            ],
        )?;
        tx.commit()?;

        info!(repo, count = inserted, "Cached issues");
        Ok(inserted)
    }

    /// Returns the cached issues of `repo` in the order they were saved.
    ///
    /// Empty if the repository was never saved or its last save was empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub fn get_issues(&self, repo: &str) -> Result<Vec<IssueRecord>, CacheError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM issues WHERE repo = ?1 ORDER BY rowid",
            ISSUE_COLUMNS.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let issues = stmt
            .query_map(params![repo], issue_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    /// Returns true if at least one issue is cached for `repo`.
    ///
    /// A repository scanned with zero open issues also reports false; use
    /// [`IssueCache::last_scan`] to tell that apart from "never scanned".
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_issues(&self, repo: &str) -> Result<bool, CacheError> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM issues WHERE repo = ?1)",
            params![repo],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Returns the number of issues cached for `repo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn issue_count(&self, repo: &str) -> Result<usize, CacheError> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM issues WHERE repo = ?1",
            params![repo],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Removes the cached issues and scan marker of `repo`.
    ///
    /// # Returns
    ///
    /// The number of issues removed.
    ///
    /// # Errors
    ///
    /// Returns an error if either delete fails.
    pub fn clear_issues(&self, repo: &str) -> Result<usize, CacheError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM issues WHERE repo = ?1", params![repo])?;
        tx.execute("DELETE FROM scans WHERE repo = ?1", params![repo])?;
        tx.commit()?;

        info!(repo, removed, "Cleared issue cache");
        Ok(removed)
    }

    /// Returns the last successful scan of `repo`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn last_scan(&self, repo: &str) -> Result<Option<ScanRecord>, CacheError> {
        let conn = self.conn()?;
        let scan = conn
            .query_row(
                "SELECT repo, scanned_at, issue_count FROM scans WHERE repo = ?1",
                params![repo],
                |row| {
                    Ok(ScanRecord {
                        repo: row.get(0)?,
                        scanned_at: row.get(1)?,
                        issue_count: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(scan)
    }
}

/// Builds a multi-row insert for `rows` issues.
fn insert_sql(rows: usize) -> String {
    let placeholders = format!("({})", vec!["?"; ISSUE_COLUMNS.len()].join(", "));
    format!(
        "INSERT INTO issues ({}) VALUES {}",
        ISSUE_COLUMNS.join(", "),
        vec![placeholders; rows].join(", ")
    )
}
