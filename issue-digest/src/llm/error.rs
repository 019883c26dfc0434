//! LLM error types.

use thiserror::Error;

/// Coarse classification of an LLM failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Missing, invalid or unauthorized API key.
    AuthError,
    /// Quota or request rate exhausted.
    RateLimited,
    /// Prompt or response blocked by the provider's safety filters.
    ContentBlocked,
    /// Anything else (transport, timeout, unexpected status).
    Other,
}

/// Errors returned by a completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key configured.
    #[error("LLM API key not configured; set GEMINI_API_KEY or llm.api-key")]
    MissingApiKey,

    /// The provider rejected the credential.
    #[error("LLM authentication failed: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// The provider is throttling requests.
    #[error("LLM rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// The prompt or response was blocked.
    #[error("LLM content blocked: {reason}")]
    ContentBlocked { reason: String },

    /// The call did not complete in time.
    #[error("LLM timed out after {0} seconds")]
    Timeout(u64),

    /// Unexpected non-success status.
    #[error("LLM API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport or decoding error.
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl LlmError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            Self::MissingApiKey | Self::Auth { .. } => LlmErrorKind::AuthError,
            Self::RateLimited { .. } => LlmErrorKind::RateLimited,
            Self::ContentBlocked { .. } => LlmErrorKind::ContentBlocked,
            Self::Timeout(_) | Self::Api { .. } | Self::Http(_) => LlmErrorKind::Other,
        }
    }
}
