//! Rate limit information.

use std::time::{SystemTime, UNIX_EPOCH};

/// Rate limit information for a specific resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Returns true if no requests are left in the current window.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns the seconds until the window resets, relative to `now`
    /// (Unix seconds). Zero once the reset time has passed.
    #[must_use]
    pub fn seconds_until_reset(&self, now: u64) -> u64 {
        self.reset.saturating_sub(now)
    }

    /// Returns the seconds until the window resets, relative to the system clock.
    #[must_use]
    pub fn seconds_until_reset_from_now(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.seconds_until_reset(now)
    }
}
