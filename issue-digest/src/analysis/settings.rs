//! Analyzer tuning.

use super::prompts::SYSTEM_PROMPT;
use crate::config::Config;

/// Parameters for every completion the analyzer makes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    /// Model name.
    pub model: String,

    /// Maximum tokens per response.
    pub max_output_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// Largest issue set analyzed in one call; larger sets are chunked.
    pub max_issues_per_chunk: usize,

    /// Characters of each issue body to include (0 omits bodies).
    pub max_body_length: usize,

    /// Batch summaries allowed in flight at once.
    pub chunk_concurrency: usize,

    /// System instruction attached to every call.
    pub system_prompt: String,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AnalyzerSettings {
    /// Collects analyzer settings from the `[llm]` and `[analysis]` sections.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_output_tokens: config.llm.max_output_tokens,
            temperature: config.llm.temperature,
            max_issues_per_chunk: config.analysis.max_issues_per_chunk,
            max_body_length: config.analysis.max_body_length,
            chunk_concurrency: config.analysis.chunk_concurrency,
            system_prompt: config
                .llm
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
        }
    }
}
