//! Notes Pipeline
//!
//! Owns the completion client and retriever and runs every generation
//! entry point against them.

use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use ulid::Ulid;

use super::document::{assemble_document, subject_header, NotesDocument};
use super::error::NotesError;
use super::hyde::generate_hyde;
use super::rag::generate_notes_with_rag;
use super::topic_notes::generate_topic_notes;
use super::topics::parse_topics;
use super::unit::{generate_unit_notes, UnitNotes, UnitStageConfig};
use super::GenerationOptions;
use crate::context::RetrievalBudget;
use crate::llm::{CompletionClient, DEFAULT_HYDE_MODEL, DEFAULT_NOTES_MODEL};
use crate::retrieval::ContextRetriever;
use crate::syllabus::{split_units, unique_slugs, Unit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    pub notes_model: String,
    /// Used for HyDE, topic parsing, topic-guided and single-topic notes
    pub hyde_model: String,
    pub budget: RetrievalBudget,
    /// Units generated at the same time; 1 runs them one after another
    pub max_concurrent_units: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            notes_model: DEFAULT_NOTES_MODEL.to_string(),
            hyde_model: DEFAULT_HYDE_MODEL.to_string(),
            budget: RetrievalBudget::default(),
            max_concurrent_units: 1,
        }
    }
}

pub struct NotesPipeline<C, R> {
    client: C,
    retriever: R,
    settings: PipelineSettings,
}

impl<C, R> NotesPipeline<C, R>
where
    C: CompletionClient,
    R: ContextRetriever,
{
    pub fn new(client: C, retriever: R, settings: PipelineSettings) -> Self {
        Self {
            client,
            retriever,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn generate_hyde(&self, topic: &str) -> Result<String, NotesError> {
        generate_hyde(&self.client, &self.settings.hyde_model, topic).await
    }

    pub async fn parse_topics(&self, syllabus_text: &str) -> Result<Vec<String>, NotesError> {
        parse_topics(&self.client, &self.settings.hyde_model, syllabus_text).await
    }

    pub async fn generate_notes_with_rag(
        &self,
        topic: &str,
        options: &GenerationOptions,
    ) -> Result<String, NotesError> {
        generate_notes_with_rag(&self.client, &self.retriever, &self.settings.hyde_model, topic, options).await
    }

    /// One notes document built around the parsed topic list
    pub async fn generate_topic_notes(
        &self,
        syllabus_text: &str,
        options: &GenerationOptions,
    ) -> Result<String, NotesError> {
        generate_topic_notes(&self.client, &self.retriever, &self.settings.hyde_model, syllabus_text, options).await
    }

    pub async fn generate_unit_notes(&self, unit: &Unit, options: &GenerationOptions) -> Result<UnitNotes, NotesError> {
        let config = UnitStageConfig {
            notes_model: &self.settings.notes_model,
            hyde_model: &self.settings.hyde_model,
            budget: &self.settings.budget,
        };
        generate_unit_notes(&self.client, &self.retriever, &config, unit, options).await
    }

    /// Notes for every unit of a syllabus, assembled into one document
    pub async fn generate_final_notes(
        &self,
        syllabus_text: &str,
        options: &GenerationOptions,
    ) -> Result<NotesDocument, NotesError> {
        let run_id = Ulid::new().to_string();
        let span = info_span!("notes_run", run_id = %run_id);

        async {
            let units = split_units(syllabus_text);
            let concurrency = self.settings.max_concurrent_units.max(1);
            info!(units = units.len(), concurrency = concurrency, "Generating notes");

            // buffered() yields in input order whatever order units finish in
            let mut unit_notes: Vec<UnitNotes> = stream::iter(units.iter())
                .map(|unit| self.generate_unit_notes(unit, options))
                .buffered(concurrency)
                .try_collect()
                .await?;

            // TOC links and section anchors both read these
            let slugs = unique_slugs(units.iter().map(|u| u.title.as_str()));
            for (notes, slug) in unit_notes.iter_mut().zip(slugs) {
                notes.slug = slug;
            }

            let subject = options.subject.as_deref();
            let document = NotesDocument {
                markdown: assemble_document(subject, &unit_notes),
                subject_header: subject_header(subject),
                run_id: run_id.clone(),
                generated_at: Utc::now(),
                units: unit_notes,
            };
            info!(
                units = document.units.len(),
                degraded = document.degraded_units(),
                "Notes document assembled"
            );
            Ok::<_, NotesError>(document)
        }
        .instrument(span)
        .await
    }
}
