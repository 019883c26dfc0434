//! Issue analysis with an LLM.
//!
//! Small issue sets are analyzed in one call. Larger sets are split into
//! batches, each batch is summarized, and a final call synthesizes the
//! summaries into one answer for the user's request.

mod chunk;
pub mod prompts;
mod settings;

pub use chunk::plan_chunks;
pub use prompts::{
    render_analysis_prompt, render_synthesis_prompt, CHUNK_SUMMARY_PROMPT, SYSTEM_PROMPT,
};
pub use settings::AnalyzerSettings;

use crate::issues::IssueRecord;
use crate::llm::{CompletionModel, CompletionRequest, LlmError};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, info_span, Instrument};

/// Prompt sent by [`Analyzer::check_connection`].
const CONNECTION_CHECK_PROMPT: &str = "Hello";

/// Runs issue analyses against a [`CompletionModel`].
#[derive(Debug, Clone)]
pub struct Analyzer<M> {
    model: M,
    settings: AnalyzerSettings,
}

impl<M: CompletionModel> Analyzer<M> {
    /// Creates an analyzer.
    #[must_use]
    pub fn new(model: M, settings: AnalyzerSettings) -> Self {
        Self { model, settings }
    }

    /// Returns the completion backend.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the analyzer settings.
    #[must_use]
    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Returns how many completion calls analyzing `issue_count` issues takes.
    #[must_use]
    pub fn planned_calls(&self, issue_count: usize) -> usize {
        let max = self.settings.max_issues_per_chunk.max(1);
        if issue_count <= max {
            1
        } else {
            issue_count.div_ceil(max) + 1
        }
    }

    /// Analyzes `issues` according to `user_prompt`.
    ///
    /// # Arguments
    ///
    /// * `issues` - The cached issue set, in cache order
    /// * `user_prompt` - What the user wants to know about the issues
    ///
    /// # Returns
    ///
    /// The model's answer; empty if the model returned no text.
    ///
    /// # Errors
    ///
    /// Returns the first failed completion. Nothing is retried and no
    /// partial analysis is returned.
    pub async fn analyze(
        &self,
        issues: &[IssueRecord],
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let span = info_span!("analyze", issues = issues.len());

        async {
            if issues.len() <= self.settings.max_issues_per_chunk.max(1) {
                info!("Analyzing issues in a single call");
                let prompt =
                    render_analysis_prompt(issues, user_prompt, self.settings.max_body_length);
                return self.complete(&prompt).await;
            }

            self.analyze_chunked(issues, user_prompt).await
        }
        .instrument(span)
        .await
    }

    async fn analyze_chunked(
        &self,
        issues: &[IssueRecord],
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let batches = plan_chunks(issues, self.settings.max_issues_per_chunk);
        let total = batches.len();
        info!(chunks = total, "Analyzing issues in chunks");

        // `buffered` yields in batch order, so summary N always belongs to batch N.
        let summaries: Vec<String> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move {
                debug!(chunk = index + 1, total, size = batch.len(), "Summarizing chunk");
                let prompt = render_analysis_prompt(
                    batch,
                    CHUNK_SUMMARY_PROMPT,
                    self.settings.max_body_length,
                );
                self.complete(&prompt).await
            })
            .buffered(self.settings.chunk_concurrency.max(1))
            .try_collect()
            .await?;

        info!(summaries = summaries.len(), "Synthesizing final analysis");
        let prompt = render_synthesis_prompt(&summaries, user_prompt);
        self.complete(&prompt).await
    }

    /// Sends a trivial prompt to verify the model is reachable.
    ///
    /// # Errors
    ///
    /// Returns the completion error if the call fails.
    pub async fn check_connection(&self) -> Result<(), LlmError> {
        self.complete(CONNECTION_CHECK_PROMPT).await.map(|_| ())
    }

    async fn complete(&self, contents: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: &self.settings.model,
            contents,
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
            system_instruction: &self.settings.system_prompt,
        };
        self.model.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::IssueState;
    use crate::llm::LlmErrorKind;
    use std::sync::Mutex;
    use std::time::Duration;

    const SYNTHESIS: &str = "final synthesized analysis";

    /// Answers batch prompts with "summary of <first title>" and synthesis
    /// prompts with [`SYNTHESIS`].
    #[derive(Default)]
    struct ScriptedModel {
        calls: Mutex<Vec<(String, String)>>,
        fail_on_title: Option<String>,
        slow_title: Option<String>,
    }

    impl ScriptedModel {
        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn prompts(&self) -> Vec<String> {
            self.calls().into_iter().map(|(contents, _)| contents).collect()
        }
    }

    fn first_title(contents: &str) -> Option<&str> {
        contents
            .lines()
            .find_map(|line| line.strip_prefix("- Title: "))
    }

    impl CompletionModel for ScriptedModel {
        async fn generate(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push((
                request.contents.to_string(),
                request.system_instruction.to_string(),
            ));

            if request.contents.starts_with("## Aggregated Issue Summaries") {
                return Ok(SYNTHESIS.to_string());
            }

            let title = first_title(request.contents).unwrap_or("nothing").to_string();
            if self.slow_title.as_deref() == Some(title.as_str()) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if self.fail_on_title.as_deref() == Some(title.as_str()) {
                return Err(LlmError::RateLimited {
                    message: "quota exhausted".to_string(),
                    retry_after_secs: None,
                });
            }
            Ok(format!("summary of {title}"))
        }
    }

    fn issues(count: u64) -> Vec<IssueRecord> {
        (1..=count)
            .map(|id| IssueRecord {
                id,
                number: id,
                repo: "octo/demo".to_string(),
                title: format!("Issue {id}"),
                body: None,
                html_url: format!("https://github.com/octo/demo/issues/{id}"),
                state: IssueState::Open,
                created_at: "2024-01-01T00:00:00Z".to_string(),
                updated_at: "2024-01-01T00:00:00Z".to_string(),
                author_login: None,
                labels: Vec::new(),
                assignees: Vec::new(),
                comments: 0,
            })
            .collect()
    }

    fn analyzer(model: ScriptedModel) -> Analyzer<ScriptedModel> {
        Analyzer::new(model, AnalyzerSettings::default())
    }

    #[tokio::test]
    async fn threshold_issue_count_uses_single_call() {
        let analyzer = analyzer(ScriptedModel::default());

        let result = analyzer.analyze(&issues(50), "What is broken?").await.unwrap();

        let prompts = analyzer.model().prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(result, "summary of Issue 1");
        assert!(prompts[0].contains("Below are 50 open issues"));
        assert!(prompts[0].contains("What is broken?"));
        assert_eq!(analyzer.planned_calls(50), 1);
    }

    #[tokio::test]
    async fn one_over_threshold_switches_to_chunks() {
        let analyzer = analyzer(ScriptedModel::default());

        let result = analyzer.analyze(&issues(51), "What is broken?").await.unwrap();

        let prompts = analyzer.model().prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(result, SYNTHESIS);
        assert!(prompts[1].contains("Below are 1 open issues"));
        assert_eq!(analyzer.planned_calls(51), 3);
    }

    #[tokio::test]
    async fn chunked_analysis_summarizes_then_synthesizes() {
        let analyzer = analyzer(ScriptedModel::default());

        let result = analyzer.analyze(&issues(120), "Top priorities?").await.unwrap();

        let prompts = analyzer.model().prompts();
        assert_eq!(result, SYNTHESIS);
        assert_eq!(prompts.len(), 4);
        assert_eq!(analyzer.planned_calls(120), 4);

        for (prompt, count) in prompts[..3].iter().zip([50, 50, 20]) {
            assert!(prompt.contains(&format!("Below are {count} open issues")));
            assert!(prompt.contains(CHUNK_SUMMARY_PROMPT));
            assert!(!prompt.contains("Top priorities?"));
        }

        let synthesis = &prompts[3];
        assert!(synthesis.contains("Batch 1:\nsummary of Issue 1"));
        assert!(synthesis.contains("Batch 2:\nsummary of Issue 51"));
        assert!(synthesis.contains("Batch 3:\nsummary of Issue 101"));
        assert!(synthesis.contains("Top priorities?"));
    }

    #[tokio::test]
    async fn every_call_carries_system_instruction() {
        let analyzer = analyzer(ScriptedModel::default());

        analyzer.analyze(&issues(120), "Top priorities?").await.unwrap();

        assert!(analyzer
            .model()
            .calls()
            .iter()
            .all(|(_, system)| system == SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn chunk_failure_aborts_before_synthesis() {
        let analyzer = analyzer(ScriptedModel {
            fail_on_title: Some("Issue 51".to_string()),
            ..ScriptedModel::default()
        });

        let error = analyzer.analyze(&issues(120), "Top priorities?").await.unwrap_err();

        assert_eq!(error.kind(), LlmErrorKind::RateLimited);
        let prompts = analyzer.model().prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts
            .iter()
            .all(|prompt| !prompt.starts_with("## Aggregated Issue Summaries")));
    }

    #[tokio::test]
    async fn concurrent_chunks_keep_batch_order() {
        let settings = AnalyzerSettings {
            chunk_concurrency: 3,
            ..AnalyzerSettings::default()
        };
        let model = ScriptedModel {
            slow_title: Some("Issue 1".to_string()),
            ..ScriptedModel::default()
        };
        let analyzer = Analyzer::new(model, settings);

        let result = analyzer.analyze(&issues(120), "Top priorities?").await.unwrap();

        assert_eq!(result, SYNTHESIS);
        let prompts = analyzer.model().prompts();
        let synthesis = prompts.last().unwrap();
        let first = synthesis.find("Batch 1:\nsummary of Issue 1\n").unwrap();
        let second = synthesis.find("Batch 2:\nsummary of Issue 51\n").unwrap();
        let third = synthesis.find("Batch 3:\nsummary of Issue 101\n").unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn check_connection_sends_greeting() {
        let analyzer = analyzer(ScriptedModel::default());

        analyzer.check_connection().await.unwrap();

        assert_eq!(analyzer.model().prompts(), vec![CONNECTION_CHECK_PROMPT.to_string()]);
    }
}
