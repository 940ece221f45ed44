//! Topic-guided notes: parse the syllabus into topics, retrieve once for the
//! whole topic list, then write one notes document around those topics.

use tracing::{info, warn};

use super::error::{NotesError, Stage};
use super::hyde::generate_hyde;
use super::topics::parse_topics;
use super::GenerationOptions;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompts::final_notes_prompt;
use crate::retrieval::{ContextRetriever, RetrievalQuery, SourceSelector};

pub const TOPIC_NOTES_TEMPERATURE: f32 = 0.25;

pub async fn generate_topic_notes<C, R>(
    client: &C,
    retriever: &R,
    model: &str,
    syllabus_text: &str,
    options: &GenerationOptions,
) -> Result<String, NotesError>
where
    C: CompletionClient,
    R: ContextRetriever,
{
    let topics = parse_topics(client, model, syllabus_text).await?;
    let seed = if topics.is_empty() {
        warn!("No topics parsed, seeding retrieval with the syllabus text");
        syllabus_text.trim().to_string()
    } else {
        topics.join(", ")
    };
    info!(topics = topics.len(), "Parsed syllabus topics");

    let passage = generate_hyde(client, model, &seed).await?;
    let query = RetrievalQuery::new(
        passage,
        options.subject.as_deref(),
        SourceSelector::from_flag(options.use_past_exam),
        options.top_k,
    );
    let context = retriever.retrieve(&query).await?;

    let request =
        CompletionRequest::new(final_notes_prompt(&topics, &context), TOPIC_NOTES_TEMPERATURE).with_model(model);
    client
        .complete(&request)
        .await
        .map_err(|e| NotesError::completion(Stage::TopicNotes, e))
}
