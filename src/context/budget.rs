//! Retrieval Budget
//!
//! Caps on how much retrieved text goes into a unit notes prompt.

use serde::{Deserialize, Serialize};

use super::truncate::truncate_context;

/// Reference context is cut to this many characters
pub const REFERENCE_MAX_CHARS: usize = 5_000;
/// Upper bound on reference passages requested per unit
pub const REFERENCE_TOP_K_CAP: u32 = 25;
/// Past-exam passages requested per unit
pub const PAST_EXAM_TOP_K: u32 = 5;
/// Default passages requested by the final notes orchestrator
pub const DEFAULT_TOP_K: u32 = 40;
/// Default passages requested by single-topic RAG notes
pub const DEFAULT_RAG_TOP_K: u32 = 12;

/// Per-unit retrieval limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalBudget {
    pub reference_max_chars: usize,
    pub reference_top_k_cap: u32,
    pub past_exam_top_k: u32,
    /// Past-exam context is left whole unless this is set
    pub truncate_past_exam: bool,
}

impl Default for RetrievalBudget {
    fn default() -> Self {
        Self {
            reference_max_chars: REFERENCE_MAX_CHARS,
            reference_top_k_cap: REFERENCE_TOP_K_CAP,
            past_exam_top_k: PAST_EXAM_TOP_K,
            truncate_past_exam: false,
        }
    }
}

impl RetrievalBudget {
    /// Reference passages to request for a caller-supplied top-k
    pub fn reference_top_k(&self, requested: u32) -> u32 {
        requested.min(self.reference_top_k_cap)
    }

    pub fn fit_reference(&self, context: &str) -> String {
        truncate_context(context, self.reference_max_chars)
    }

    pub fn fit_past_exam(&self, context: &str) -> String {
        if self.truncate_past_exam {
            truncate_context(context, self.reference_max_chars)
        } else {
            context.to_string()
        }
    }
}
