//! Rate limit lookups for the GitHub API.
//!
//! Reading `/rate_limit` does not count against the quota, so it is safe to
//! call after a failure to find out whether the quota is exhausted.

mod info;

pub use info::RateLimitInfo;

use octocrab::Octocrab;

/// Checks the current rate limit status for the core API (issues, repos, etc.).
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    })
}
