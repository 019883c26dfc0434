//! Upstream (GitHub) error types.

use thiserror::Error;

/// Coarse classification of an upstream failure, for callers that map
/// errors to user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Malformed repository identifier; no request was made.
    InvalidFormat,
    /// Repository does not exist or is not visible.
    NotFound,
    /// Credential missing or rejected.
    Unauthorized,
    /// Permission denied for reasons other than quota.
    Forbidden,
    /// Primary or secondary rate limit exhausted.
    RateLimited,
    /// Request did not complete in time.
    Timeout,
    /// Anything else (transport, decoding, 5xx).
    Other,
}

/// Errors that can occur while fetching issues from GitHub.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Repository identifier does not match "owner/name".
    #[error("Invalid repository '{repo}': expected owner/name")]
    InvalidFormat { repo: String },

    /// GitHub answered with a non-success status.
    #[error("GitHub returned {status} for {repo}: {message}")]
    Status {
        repo: String,
        kind: UpstreamErrorKind,
        status: u16,
        rate_limit_remaining: Option<u32>,
        message: String,
    },

    /// Request timed out.
    #[error("GitHub request for {repo} timed out after {secs} seconds")]
    Timeout { repo: String, secs: u64 },

    /// GitHub API error (transport, decoding or client setup).
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),
}

impl UpstreamError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            Self::InvalidFormat { .. } => UpstreamErrorKind::InvalidFormat,
            Self::Status { kind, .. } => *kind,
            Self::Timeout { .. } => UpstreamErrorKind::Timeout,
            Self::GitHubError(octocrab::Error::GitHub { source, .. }) => {
                classify_status(source.status_code.as_u16(), &source.message, None)
            }
            Self::GitHubError(_) => UpstreamErrorKind::Other,
        }
    }

    /// Returns the HTTP status code, if GitHub answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::GitHubError(octocrab::Error::GitHub { source, .. }) => {
                Some(source.status_code.as_u16())
            }
            _ => None,
        }
    }

    /// Returns the remaining core quota observed when the error occurred.
    #[must_use]
    pub fn rate_limit_remaining(&self) -> Option<u32> {
        match self {
            Self::Status {
                rate_limit_remaining,
                ..
            } => *rate_limit_remaining,
            _ => None,
        }
    }
}

/// Classifies a non-success GitHub status.
///
/// GitHub reports quota exhaustion as 403 as well as 429, so a 403 is only
/// a permission denial when neither the message nor the remaining quota
/// points at the rate limit.
pub(crate) fn classify_status(
    status: u16,
    message: &str,
    rate_limit_remaining: Option<u32>,
) -> UpstreamErrorKind {
    match status {
        401 => UpstreamErrorKind::Unauthorized,
        404 => UpstreamErrorKind::NotFound,
        429 => UpstreamErrorKind::RateLimited,
        403 if mentions_rate_limit(message) || rate_limit_remaining == Some(0) => {
            UpstreamErrorKind::RateLimited
        }
        403 => UpstreamErrorKind::Forbidden,
        _ => UpstreamErrorKind::Other,
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    message.to_lowercase().contains("rate limit")
}
