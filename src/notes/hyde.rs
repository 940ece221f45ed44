//! Hypothetical document generation. The passage is only used as a
//! retrieval query, never shown to the reader.

use tracing::debug;

use super::error::{NotesError, Stage};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompts::hyde_prompt;

pub const HYDE_TEMPERATURE: f32 = 0.2;

pub async fn generate_hyde<C: CompletionClient>(client: &C, model: &str, topic: &str) -> Result<String, NotesError> {
    let request = CompletionRequest::new(hyde_prompt(topic), HYDE_TEMPERATURE).with_model(model);
    let passage = client
        .complete(&request)
        .await
        .map_err(|e| NotesError::completion(Stage::Hyde, e))?;
    debug!(chars = passage.chars().count(), "HyDE passage generated");
    Ok(passage)
}
