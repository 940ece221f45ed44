//! Notes Generation
//!
//! Stage functions (HyDE, topic parsing, unit notes, topic-guided and
//! single-topic notes) and
//! the [`NotesPipeline`] that runs them with injected collaborators.

pub mod document;
pub mod error;
pub mod hyde;
pub mod pipeline;
pub mod rag;
pub mod topic_notes;
pub mod topics;
pub mod unit;

use serde::{Deserialize, Serialize};

use crate::context::DEFAULT_TOP_K;

pub use document::{assemble_document, subject_header, NotesDocument};
pub use error::{FailurePolicy, NotesError, Stage};
pub use pipeline::{NotesPipeline, PipelineSettings};
pub use topics::parse_topic_reply;
pub use unit::{error_document, UnitNotes, UnitOutcome};

/// Caller choices for one generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub subject: Option<String>,
    /// Also pull previous exam questions into the prompt
    pub use_past_exam: bool,
    pub top_k: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            subject: None,
            use_past_exam: false,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl GenerationOptions {
    pub fn new(subject: Option<&str>) -> Self {
        Self {
            subject: subject.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    pub fn with_past_exam(mut self, use_past_exam: bool) -> Self {
        self.use_past_exam = use_past_exam;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }
}
