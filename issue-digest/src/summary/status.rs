//! Cache status.

use crate::cache::ScanRecord;

/// What the cache holds for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    /// Repository in "owner/name" format.
    pub repo: String,

    /// Number of cached issues.
    pub issue_count: usize,

    /// The last successful scan, if any.
    pub last_scan: Option<ScanRecord>,
}

impl CacheStatus {
    /// Returns true if the repository has been scanned at least once.
    #[must_use]
    pub fn is_scanned(&self) -> bool {
        self.last_scan.is_some() || self.issue_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(issue_count: usize, scanned: bool) -> CacheStatus {
        CacheStatus {
            repo: "octo/demo".to_string(),
            issue_count,
            last_scan: scanned.then(|| ScanRecord {
                repo: "octo/demo".to_string(),
                scanned_at: "2024-06-01T12:00:00Z".to_string(),
                issue_count,
            }),
        }
    }

    #[test]
    fn scanned_with_zero_issues_is_scanned() {
        assert!(status(0, true).is_scanned());
        assert!(!status(0, false).is_scanned());
        assert!(status(3, true).is_scanned());
    }
}
