//! Analysis result.

/// Analysis shown when a repository was scanned but had no open issues.
pub const NO_OPEN_ISSUES: &str = "No open issues found in this repository. \
The repository appears to be well-maintained with no pending issues!";

/// Result of analyzing one repository's cached issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// Repository in "owner/name" format.
    pub repo: String,

    /// Number of cached issues the analysis covered.
    pub issues_analyzed: usize,

    /// Completion calls made (0 when there was nothing to analyze).
    pub llm_calls: usize,

    /// The analysis text.
    pub analysis: String,
}

impl AnalysisOutcome {
    /// Outcome for a repository with no open issues; no LLM call is made.
    #[must_use]
    pub fn no_open_issues(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            issues_analyzed: 0,
            llm_calls: 0,
            analysis: NO_OPEN_ISSUES.to_string(),
        }
    }
}
