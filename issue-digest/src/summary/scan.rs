//! Scan result.

/// Result of scanning one repository into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Repository in "owner/name" format.
    pub repo: String,

    /// Open issues (pull requests excluded) fetched and stored.
    pub issues_fetched: usize,

    /// Whether the cache now holds exactly the fetched set.
    pub cached_successfully: bool,
}
