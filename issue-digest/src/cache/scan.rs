//! Scan bookkeeping.

/// The last successful scan of a repository.
///
/// Written in the same transaction as the issue replacement, so a repository
/// that was scanned and has zero open issues still has a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// Repository in "owner/name" format.
    pub repo: String,

    /// RFC 3339 timestamp of the scan.
    pub scanned_at: String,

    /// Number of issues stored by the scan.
    pub issue_count: usize,
}
