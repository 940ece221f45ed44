//! Topic Parsing
//!
//! Asks the model for a JSON list of topic names. Models do not always
//! comply, so a fenced reply is unwrapped and anything that still isn't a
//! JSON list falls back to one topic per line.

use tracing::{debug, warn};

use super::error::{NotesError, Stage};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompts::topics_prompt;

pub const TOPICS_TEMPERATURE: f32 = 0.0;
/// Fallback lines must be longer than this
const MIN_TOPIC_LINE_CHARS: usize = 2;

pub async fn parse_topics<C: CompletionClient>(
    client: &C,
    model: &str,
    syllabus_text: &str,
) -> Result<Vec<String>, NotesError> {
    let request = CompletionRequest::new(topics_prompt(syllabus_text), TOPICS_TEMPERATURE).with_model(model);
    let reply = client
        .complete(&request)
        .await
        .map_err(|e| NotesError::completion(Stage::TopicParsing, e))?;
    Ok(parse_topic_reply(&reply))
}

/// Turn a model reply into topic names
pub fn parse_topic_reply(reply: &str) -> Vec<String> {
    let body = strip_code_fence(reply.trim());

    if let Ok(topics) = serde_json::from_str::<Vec<String>>(body) {
        debug!(count = topics.len(), "Parsed topics as JSON");
        return topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    warn!("Topic reply was not a JSON list, splitting lines");
    body.lines()
        .map(|line| line.trim_matches(|c: char| c == '-' || c == '•' || c.is_whitespace()))
        .filter(|line| line.chars().count() > MIN_TOPIC_LINE_CHARS)
        .map(str::to_string)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```json)
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCompletion;

    #[test]
    fn test_json_reply() {
        let topics = parse_topic_reply(r#"["Sorting", " Hashing ", ""]"#);
        assert_eq!(topics, vec!["Sorting", "Hashing"]);
    }

    #[test]
    fn test_fenced_json_reply() {
        let reply = "```json\n[\"Graphs\", \"Trees\"]\n```";
        assert_eq!(parse_topic_reply(reply), vec!["Graphs", "Trees"]);
    }

    #[test]
    fn test_line_fallback() {
        let reply = "Here are the topics:\n- Process scheduling\n• Deadlocks\n- IO\n\n";
        assert_eq!(
            parse_topic_reply(reply),
            vec!["Here are the topics:", "Process scheduling", "Deadlocks"]
        );
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(strip_code_fence("```\n[\"A1\"]"), "[\"A1\"]");
        assert_eq!(strip_code_fence("plain"), "plain");
    }

    #[tokio::test]
    async fn test_parse_topics_uses_zero_temperature() {
        let client = FakeCompletion::new().with_reply(Stage::TopicParsing, r#"["Normalization"]"#);
        let topics = parse_topics(&client, "scout", "UNIT-3: Normalization").await.unwrap();
        assert_eq!(topics, vec!["Normalization"]);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.0);
        assert_eq!(requests[0].model.as_deref(), Some("scout"));
    }

    #[tokio::test]
    async fn test_parse_topics_propagates_failure() {
        let client = FakeCompletion::failing_always();
        let err = parse_topics(&client, "scout", "anything").await.unwrap_err();
        assert_eq!(err.stage(), Stage::TopicParsing);
    }
}
