// SyllabusGPT Library
// Exports the notes pipeline and its collaborators for the CLI binary

pub mod chroma;
pub mod config;
pub mod context;
pub mod llm;
pub mod notes;
pub mod prompts;
pub mod retrieval;
pub mod retry;
pub mod syllabus;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for CLI
pub use chroma::{get_collection_status, ChromaClient, ChromaConfig, ChromaError, CollectionStatus};
pub use config::{default_config_path, load_config, save_config, AppConfig, ConfigError};
pub use context::{count_tokens, truncate_context, RetrievalBudget, DEFAULT_RAG_TOP_K, DEFAULT_TOP_K};
pub use llm::{ChatClient, CompletionClient, CompletionRequest, LlmConfig, LlmError};
pub use notes::{
    FailurePolicy, GenerationOptions, NotesDocument, NotesError, NotesPipeline, PipelineSettings, Stage,
    UnitNotes, UnitOutcome,
};
pub use retrieval::{ChromaRetriever, ContextRetriever, RetrievalError, RetrievalQuery, SourceSelector};
pub use syllabus::{extract_subtopics, split_units, unique_slugs, unit_slug, Unit};
