//! Unit Notes
//!
//! HyDE, retrieval, prompt build and completion for one syllabus unit. A
//! failed notes completion degrades into an error document; HyDE and
//! retrieval failures are returned to the caller.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{FailurePolicy, NotesError, Stage};
use super::hyde::generate_hyde;
use super::GenerationOptions;
use crate::context::{prompt_tokens, RetrievalBudget};
use crate::llm::{CompletionClient, CompletionRequest, LlmError};
use crate::prompts::{hyde_seed, past_exam_section, unit_notes_prompt, UnitPromptInput};
use crate::retrieval::{ContextRetriever, RetrievalQuery, SourceSelector};
use crate::syllabus::{extract_subtopics, Unit};

pub const UNIT_NOTES_TEMPERATURE: f32 = 0.3;
pub const UNIT_NOTES_MAX_TOKENS: u32 = 6000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum UnitOutcome {
    Generated,
    Degraded { error: String },
}

/// Markdown for one unit plus how it was produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitNotes {
    pub title: String,
    pub slug: String,
    pub markdown: String,
    pub outcome: UnitOutcome,
}

impl UnitNotes {
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Degraded { .. })
    }
}

/// Stand-in document for a unit whose notes could not be generated
pub fn error_document(title: &str, error: &LlmError) -> String {
    format!("# Error Generating Notes for {}\n\nTechnical error: {}", title, error)
}

/// Models and budget used by the unit stage
pub struct UnitStageConfig<'a> {
    pub notes_model: &'a str,
    pub hyde_model: &'a str,
    pub budget: &'a RetrievalBudget,
}

pub async fn generate_unit_notes<C, R>(
    client: &C,
    retriever: &R,
    config: &UnitStageConfig<'_>,
    unit: &Unit,
    options: &GenerationOptions,
) -> Result<UnitNotes, NotesError>
where
    C: CompletionClient,
    R: ContextRetriever,
{
    let subject = options.subject.as_deref();
    let subtopics = extract_subtopics(&unit.body);
    debug!(unit = %unit.title, subtopics = subtopics.len(), "Extracted subtopics");

    let seed = hyde_seed(&unit.title, subject, &unit.body);
    let passage = generate_hyde(client, config.hyde_model, &seed).await?;

    let reference_query = RetrievalQuery::new(
        passage.as_str(),
        subject,
        SourceSelector::Reference,
        config.budget.reference_top_k(options.top_k),
    );
    let reference_raw = retriever.retrieve(&reference_query).await?;

    let past_exam_context = if options.use_past_exam {
        let query = RetrievalQuery::new(
            passage.as_str(),
            subject,
            SourceSelector::PastExam,
            config.budget.past_exam_top_k,
        );
        let raw = retriever.retrieve(&query).await?;
        past_exam_section(&config.budget.fit_past_exam(&raw))
    } else {
        String::new()
    };

    let reference_context = config.budget.fit_reference(&reference_raw);
    let prompt = unit_notes_prompt(&UnitPromptInput {
        subject,
        unit_title: &unit.title,
        unit_body: &unit.body,
        reference_context: &reference_context,
        past_exam_context: &past_exam_context,
        subtopics: &subtopics,
    });
    info!(
        unit = %unit.title,
        prompt_tokens = prompt_tokens(&prompt.system, &prompt.user),
        "Built unit notes prompt"
    );

    let request = CompletionRequest::new(prompt, UNIT_NOTES_TEMPERATURE)
        .with_model(config.notes_model)
        .with_max_tokens(UNIT_NOTES_MAX_TOKENS);

    let (markdown, outcome) = match client.complete(&request).await {
        Ok(text) => (text, UnitOutcome::Generated),
        Err(e) => match Stage::UnitNotes.policy() {
            FailurePolicy::Degrade => {
                warn!(unit = %unit.title, error = %e, "Unit notes failed, inserting error section");
                (
                    error_document(&unit.title, &e),
                    UnitOutcome::Degraded { error: e.to_string() },
                )
            }
            FailurePolicy::Propagate => return Err(NotesError::completion(Stage::UnitNotes, e)),
        },
    };

    Ok(UnitNotes {
        title: unit.title.clone(),
        slug: unit.slug(),
        markdown,
        outcome,
    })
}
