use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;
use crate::retrieval::RetrievalError;

/// A step of notes generation that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Hyde,
    Retrieval,
    UnitNotes,
    TopicParsing,
    TopicNotes,
    RagNotes,
}

/// What a failure in a stage does to the surrounding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Abort and return the error to the caller
    Propagate,
    /// Replace the stage output with an error document and keep going
    Degrade,
}

impl Stage {
    pub fn policy(self) -> FailurePolicy {
        match self {
            Stage::UnitNotes => FailurePolicy::Degrade,
            Stage::Hyde | Stage::Retrieval | Stage::TopicParsing | Stage::TopicNotes | Stage::RagNotes => {
                FailurePolicy::Propagate
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Hyde => "hyde",
            Stage::Retrieval => "retrieval",
            Stage::UnitNotes => "unit_notes",
            Stage::TopicParsing => "topic_parsing",
            Stage::TopicNotes => "topic_notes",
            Stage::RagNotes => "rag_notes",
        }
    }
}

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("{} stage failed: {source}", .stage.as_str())]
    Completion {
        stage: Stage,
        #[source]
        source: LlmError,
    },
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl NotesError {
    pub fn completion(stage: Stage, source: LlmError) -> Self {
        NotesError::Completion { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            NotesError::Completion { stage, .. } => *stage,
            NotesError::Retrieval(_) => Stage::Retrieval,
        }
    }
}

impl Serialize for NotesError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
