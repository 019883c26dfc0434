//! Issue cache schema.

use rusqlite::{Connection, Result};

/// The cache schema. Idempotent: every statement uses `IF NOT EXISTS`.
pub const SCHEMA_SQL: &str = r"
    -- One row per cached issue. The same GitHub id may be cached under
    -- several repositories, so the key includes the repository.
    CREATE TABLE IF NOT EXISTS issues (
        repo TEXT NOT NULL,
        id INTEGER NOT NULL,
        number INTEGER NOT NULL,
        title TEXT NOT NULL,
        body TEXT,
        html_url TEXT NOT NULL,
        state TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        author_login TEXT,
        labels TEXT NOT NULL DEFAULT '[]',
        comments INTEGER NOT NULL DEFAULT 0,
        assignees TEXT NOT NULL DEFAULT '[]',
        PRIMARY KEY (repo, id)
    );
    CREATE INDEX IF NOT EXISTS idx_issues_repo ON issues(repo);

    -- Last successful scan per repository, including scans that found nothing.
    CREATE TABLE IF NOT EXISTS scans (
        repo TEXT PRIMARY KEY,
        scanned_at TEXT NOT NULL,
        issue_count INTEGER NOT NULL
    );
";

/// Applies the schema and connection pragmas.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Readers in other processes are not blocked by a running scan.
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}
