//! Single-topic notes: HyDE, one retrieval, then notes from the retrieved
//! context or from general knowledge when nothing was found.

use tracing::info;

use super::error::{NotesError, Stage};
use super::hyde::generate_hyde;
use super::GenerationOptions;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompts::{rag_notes_prompt, RAG_NO_CONTEXT_CHUNK};
use crate::retrieval::{ContextRetriever, RetrievalQuery, SourceSelector};

pub const RAG_NOTES_TEMPERATURE: f32 = 0.15;

pub async fn generate_notes_with_rag<C, R>(
    client: &C,
    retriever: &R,
    model: &str,
    topic: &str,
    options: &GenerationOptions,
) -> Result<String, NotesError>
where
    C: CompletionClient,
    R: ContextRetriever,
{
    let passage = generate_hyde(client, model, topic).await?;

    let query = RetrievalQuery::new(
        passage,
        options.subject.as_deref(),
        SourceSelector::from_flag(options.use_past_exam),
        options.top_k,
    );
    let context = retriever.retrieve(&query).await?;

    let chunks = if context.trim().is_empty() {
        info!("No context in knowledge base, answering from general knowledge");
        vec![RAG_NO_CONTEXT_CHUNK.to_string()]
    } else {
        vec![context]
    };

    let request = CompletionRequest::new(rag_notes_prompt(topic, &chunks), RAG_NOTES_TEMPERATURE).with_model(model);
    client
        .complete(&request)
        .await
        .map_err(|e| NotesError::completion(Stage::RagNotes, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCompletion, FakeRetriever};

    #[tokio::test]
    async fn test_rag_with_context() {
        let client = FakeCompletion::new().with_reply(Stage::RagNotes, "# Deadlocks");
        let retriever = FakeRetriever::empty().with_context(SourceSelector::PastExam, "Q. State Coffman conditions.");
        let options = GenerationOptions::new(Some("OS")).with_past_exam(true).with_top_k(12);

        let notes = generate_notes_with_rag(&client, &retriever, "scout", "Deadlocks", &options)
            .await
            .unwrap();
        assert_eq!(notes, "# Deadlocks");

        let queries = retriever.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].source, SourceSelector::PastExam);
        assert_eq!(queries[0].top_k, 12);

        let request = &client.requests_for(Stage::RagNotes)[0];
        assert_eq!(request.temperature, RAG_NOTES_TEMPERATURE);
        assert!(request.user.contains("Q. State Coffman conditions."));
        assert!(!request.user.contains(RAG_NO_CONTEXT_CHUNK));
    }

    #[tokio::test]
    async fn test_rag_empty_context_fallback() {
        let client = FakeCompletion::new();
        let options = GenerationOptions::new(None).with_top_k(12);

        let notes = generate_notes_with_rag(&client, &FakeRetriever::empty(), "scout", "Paging", &options)
            .await
            .unwrap();
        assert!(!notes.is_empty());

        let request = &client.requests_for(Stage::RagNotes)[0];
        assert!(request.user.contains(RAG_NO_CONTEXT_CHUNK));
    }

    #[tokio::test]
    async fn test_rag_failure_propagates() {
        let client = FakeCompletion::new().failing_on(Stage::RagNotes);
        let options = GenerationOptions::new(None);
        let err = generate_notes_with_rag(&client, &FakeRetriever::empty(), "scout", "Paging", &options)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::RagNotes);
    }
}
