//! Gemini `generateContent` client.

use super::{CompletionModel, CompletionRequest, LlmConfig, LlmError};
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Finish reasons that mean the response was withheld.
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// Calls the Gemini REST API.
///
/// Built once and reused; the underlying HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] if no key is configured, or
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            client: Client::builder().build()?,
            api_key: api_key.to_string(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Overrides the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let url = endpoint(&self.base_url, request.model);
        debug!(model = request.model, chars = request.contents.len(), "Calling Gemini");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::new(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, status = status.as_u16(), "Failed to read Gemini error body");
                    String::new()
                }
            };
            return Err(classify_failure(status.as_u16(), &body, retry_after_secs));
        }

        let parsed = response.json::<GenerateContentResponse>().await?;
        response_text(parsed)
    }
}

impl CompletionModel for GeminiClient {
    async fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        tokio::time::timeout(self.timeout, self.send(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
    }
}

fn endpoint(base_url: &str, model: &str) -> String {
    format!("{base_url}/v1beta/models/{model}:generateContent")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(request: &CompletionRequest<'a>) -> Self {
        let system_instruction =
            (!request.system_instruction.is_empty()).then_some(SystemInstruction {
                parts: [Part {
                    text: request.system_instruction,
                }],
            });

        Self {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: request.contents,
                }],
            }],
            system_instruction,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Extracts the text of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::ContentBlocked { reason });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(String::new());
    };

    let text: String = candidate
        .content
        .into_iter()
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        if let Some(reason) = candidate
            .finish_reason
            .filter(|reason| BLOCKING_FINISH_REASONS.contains(&reason.as_str()))
        {
            return Err(LlmError::ContentBlocked { reason });
        }
    }

    Ok(text)
}

/// Maps a non-success response to an [`LlmError`].
fn classify_failure(status: u16, body: &str, retry_after_secs: Option<u64>) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => LlmError::Auth {
            status: Some(status),
            message,
        },
        400 if message.to_lowercase().contains("api key") => LlmError::Auth {
            status: Some(status),
            message,
        },
        429 => LlmError::RateLimited {
            message,
            retry_after_secs,
        },
        _ => LlmError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use httpmock::prelude::*;
    use serde_json::json;

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn client(server: &MockServer) -> GeminiClient {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let config = LlmConfig {
            api_key: Some("test-key".to_string()),
            base_url: Some(format!("{}/", server.base_url())),
            ..LlmConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn request<'a>(contents: &'a str, system: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: "gemini-2.0-flash",
            contents,
            max_output_tokens: 2048,
            temperature: 0.7,
            system_instruction: system,
        }
    }

    fn parse(value: serde_json::Value) -> Result<String, LlmError> {
        response_text(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn endpoint_includes_model() {
        assert_eq!(
            endpoint("https://generativelanguage.googleapis.com", "gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::new(&request(
            "Analyze these",
            "You are an expert",
        )))
        .unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Analyze these" }] }],
                "systemInstruction": { "parts": [{ "text": "You are an expert" }] },
                "generationConfig": { "maxOutputTokens": 2048, "temperature": 0.7 }
            })
        );
    }

    #[test]
    fn request_body_omits_empty_system_instruction() {
        let body = serde_json::to_value(GenerateContentRequest::new(&request("Hello", ""))).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn concatenates_first_candidate_parts() {
        let text = parse(json!({
            "candidates": [
                {
                    "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                    "finishReason": "STOP"
                },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(text, "Hello world");
    }

    #[test]
    fn missing_text_is_empty_string() {
        assert_eq!(parse(json!({})).unwrap(), "");
        assert_eq!(parse(json!({ "candidates": [] })).unwrap(), "");
        assert_eq!(
            parse(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] })).unwrap(),
            ""
        );
    }

    #[test]
    fn prompt_block_is_content_blocked() {
        let error = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap_err();

        assert_eq!(error.kind(), LlmErrorKind::ContentBlocked);
    }

    #[test]
    fn textless_safety_stop_is_content_blocked() {
        let error = parse(json!({
            "candidates": [{ "finishReason": "PROHIBITED_CONTENT" }]
        }))
        .unwrap_err();

        assert!(matches!(error, LlmError::ContentBlocked { reason } if reason == "PROHIBITED_CONTENT"));
    }

    #[test]
    fn safety_stop_with_text_keeps_text() {
        let text = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "partial" }] },
                "finishReason": "SAFETY"
            }]
        }))
        .unwrap();

        assert_eq!(text, "partial");
    }

    #[test]
    fn classifies_auth_failures() {
        let invalid_key = json!({
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" }
        })
        .to_string();

        assert_eq!(classify_failure(400, &invalid_key, None).kind(), LlmErrorKind::AuthError);
        assert_eq!(classify_failure(401, "", None).kind(), LlmErrorKind::AuthError);
        assert_eq!(
            classify_failure(403, "permission denied", None).kind(),
            LlmErrorKind::AuthError
        );
    }

    #[test]
    fn classifies_rate_limit_with_retry_after() {
        let body = json!({
            "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
        })
        .to_string();

        let error = classify_failure(429, &body, Some(17));

        assert!(matches!(
            error,
            LlmError::RateLimited { ref message, retry_after_secs: Some(17) }
                if message == "Resource has been exhausted"
        ));
    }

    #[test]
    fn other_statuses_are_other() {
        let error = classify_failure(400, "Invalid JSON payload received.", None);
        assert_eq!(error.kind(), LlmErrorKind::Other);
        assert!(matches!(error, LlmError::Api { status: 400, .. }));

        assert_eq!(classify_failure(503, "overloaded", None).kind(), LlmErrorKind::Other);
    }

    #[test]
    fn new_requires_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(GeminiClient::new(&config), Err(LlmError::MissingApiKey)));

        let blank = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(GeminiClient::new(&blank), Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn generate_sends_key_header_and_body() {
        let server = MockServer::start();
        let call = server.mock(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .header("x-goog-api-key", "test-key")
                .json_body(json!({
                    "contents": [{ "role": "user", "parts": [{ "text": "Analyze these" }] }],
                    "systemInstruction": { "parts": [{ "text": "You are an expert" }] },
                    "generationConfig": { "maxOutputTokens": 2048, "temperature": 0.7 }
                }));
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Two themes." }] },
                    "finishReason": "STOP"
                }]
            }));
        });

        let text = client(&server)
            .generate(&request("Analyze these", "You are an expert"))
            .await
            .unwrap();

        assert_eq!(text, "Two themes.");
        assert_eq!(call.calls(), 1);
    }

    #[tokio::test]
    async fn generate_reads_retry_after_on_429() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(GENERATE_PATH);
            then.status(429).header("retry-after", "17").json_body(json!({
                "error": { "code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED" }
            }));
        });

        let error = client(&server)
            .generate(&request("Hello", ""))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            LlmError::RateLimited { ref message, retry_after_secs: Some(17) }
                if message == "Resource has been exhausted"
        ));
    }

    #[tokio::test]
    async fn generate_classifies_rejected_key() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(GENERATE_PATH);
            then.status(400).json_body(json!({
                "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" }
            }));
        });

        let error = client(&server)
            .generate(&request("Hello", ""))
            .await
            .unwrap_err();

        assert!(matches!(error, LlmError::Auth { status: Some(400), .. }));
    }

    #[tokio::test]
    async fn generate_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(GENERATE_PATH);
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(json!({ "candidates": [] }));
        });

        let error = client(&server)
            .with_timeout(Duration::from_millis(100))
            .generate(&request("Hello", ""))
            .await
            .unwrap_err();

        assert!(matches!(error, LlmError::Timeout(_)));
        assert_eq!(error.kind(), LlmErrorKind::Other);
    }
}
