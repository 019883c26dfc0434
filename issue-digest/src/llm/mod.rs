//! LLM completion interface and the Gemini client.

mod config;
mod error;
mod gemini;

pub use config::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiClient;

use std::future::Future;

/// One generate-content call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    /// Model name.
    pub model: &'a str,

    /// User content (the rendered prompt).
    pub contents: &'a str,

    /// Maximum tokens in the response.
    pub max_output_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// System instruction sent with the call.
    pub system_instruction: &'a str,
}

/// A text completion backend.
///
/// Implemented by [`GeminiClient`]; tests substitute scripted fakes.
pub trait CompletionModel: Send + Sync {
    /// Runs one completion and returns the response text.
    ///
    /// A response without text yields an empty string.
    fn generate(
        &self,
        request: &CompletionRequest<'_>,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}
