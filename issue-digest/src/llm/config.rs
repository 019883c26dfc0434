//! LLM provider configuration.

use serde::Deserialize;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// `[llm]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LlmConfig {
    /// API key; usually supplied through `GEMINI_API_KEY` by the CLI.
    pub api_key: Option<String>,

    /// Model name (e.g., "gemini-2.0-flash").
    pub model: String,

    /// Maximum tokens per response.
    pub max_output_tokens: u32,

    /// Sampling temperature (0.0-2.0).
    pub temperature: f64,

    /// API base URL (optional).
    pub base_url: Option<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Replaces the built-in system instruction (optional).
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: 2048,
            temperature: 0.7,
            base_url: None,
            timeout_secs: 120,
            system_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Returns the configured base URL or the public Gemini endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
