//! Configuration loading.
//!
//! Settings come from an optional TOML file with `[github]`, `[llm]`,
//! `[analysis]` and `[cache]` sections. Every key has a default, so a missing
//! file or section is not an error.
//!
//! ```toml
//! [github]
//! timeout-secs = 30
//!
//! [llm]
//! model = "gemini-2.0-flash"
//! max-output-tokens = 2048
//! temperature = 0.7
//!
//! [analysis]
//! max-issues-per-chunk = 50
//!
//! [cache]
//! path = "issues.db"
//! ```

mod error;
mod sections;

pub use crate::llm::LlmConfig;
pub use error::ConfigError;
pub use sections::{AnalysisConfig, CacheConfig, GitHubConfig};

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Loads and validates the configuration file at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds an out-of-range setting.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&contents, &path.display().to_string())?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Arguments
    ///
    /// * `contents` - TOML text
    /// * `path` - Where the text came from, for error messages
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn parse(contents: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::TomlError {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is within range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperature = self.llm.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("{temperature} must be finite and in range 0.0-2.0"),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model", "must not be empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout-secs", "must be at least 1"));
        }
        if self.github.timeout_secs == 0 {
            return Err(invalid("github.timeout-secs", "must be at least 1"));
        }
        if self.llm.max_output_tokens == 0 {
            return Err(invalid("llm.max-output-tokens", "must be at least 1"));
        }
        if self.analysis.max_issues_per_chunk == 0 {
            return Err(invalid("analysis.max-issues-per-chunk", "must be at least 1"));
        }
        if self.analysis.chunk_concurrency == 0 {
            return Err(invalid("analysis.chunk-concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}
