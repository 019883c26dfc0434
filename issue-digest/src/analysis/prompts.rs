//! Prompt text sent to the LLM.

use crate::issues::IssueRecord;

/// Default system instruction attached to every completion call.
pub const SYSTEM_PROMPT: &str = "\
You are an expert software development analyst specializing in GitHub issue analysis.
Your role is to help maintainers and developers understand patterns, prioritize work, and identify themes in their issue trackers.

When analyzing issues, consider:
- Common themes and recurring problems
- Severity and potential impact
- User sentiment and frustration levels
- Dependencies between issues
- Quick wins vs long-term projects

Be concise but thorough. Use bullet points and clear structure in your responses.
Focus on actionable insights that help maintainers make decisions.";

/// Instruction used for each batch when a large issue set is split.
pub const CHUNK_SUMMARY_PROMPT: &str =
    "Summarize the key themes, patterns, and notable issues in this batch. Be concise.";

/// Renders the issues and the user's request into one analysis prompt.
///
/// # Arguments
///
/// * `issues` - Issues to include, numbered from 1 in the given order
/// * `user_prompt` - The caller's request, included verbatim
/// * `max_body_length` - Characters of each body to include; 0 omits bodies
#[must_use]
pub fn render_analysis_prompt(
    issues: &[IssueRecord],
    user_prompt: &str,
    max_body_length: usize,
) -> String {
    let mut prompt = format!(
        "## GitHub Issues Data\n\nBelow are {} open issues from a GitHub repository:\n\n",
        issues.len()
    );

    for (index, issue) in issues.iter().enumerate() {
        let labels = issue.label_names().collect::<Vec<_>>().join(", ");
        let labels = if labels.is_empty() { "none" } else { labels.as_str() };

        prompt.push_str(&format!(
            "Issue #{}:\n- Title: {}\n- Labels: {labels}\n",
            index + 1,
            issue.title
        ));
        if max_body_length > 0 {
            prompt.push_str(&format!(
                "- Description: {}\n",
                describe(issue.body.as_deref(), max_body_length)
            ));
        }
        prompt.push_str("---\n");
    }

    prompt.push_str(&format!(
        "\n## Analysis Request\n\n{user_prompt}\n\n\
         Please provide a comprehensive analysis based on the issues above."
    ));
    prompt
}

/// Renders the per-batch summaries and the user's request into the final
/// synthesis prompt.
#[must_use]
pub fn render_synthesis_prompt(summaries: &[String], user_prompt: &str) -> String {
    let batches = summaries
        .iter()
        .enumerate()
        .map(|(index, summary)| format!("Batch {}:\n{summary}", index + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "## Aggregated Issue Summaries\n\n\
         The following are summaries from analyzing multiple batches of issues:\n\n\
         {batches}\n\n\
         ## Final Analysis Request\n\n\
         {user_prompt}\n\n\
         Please synthesize the above summaries into a comprehensive final analysis."
    )
}

fn describe(body: Option<&str>, max_chars: usize) -> String {
    match body.map(str::trim) {
        Some(body) if !body.is_empty() => body.chars().take(max_chars).collect(),
        _ => "No description".to_string(),
    }
}
