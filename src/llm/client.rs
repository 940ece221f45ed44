use serde::Serialize;
use std::future::Future;
use thiserror::Error;

use crate::prompts::PromptPair;
use crate::retry::Retryable;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM HTTP error: {0}")]
    Http(String),
    #[error("LLM request timed out: {0}")]
    Timeout(String),
    #[error("LLM API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM configuration error: {0}")]
    Config(String),
    #[error("Unexpected LLM response: {0}")]
    Unexpected(String),
}

impl Serialize for LlmError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::Http(e.to_string())
        }
    }
}

impl Retryable for LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Timeout(_) => true,
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            LlmError::Config(_) | LlmError::Unexpected(_) => false,
        }
    }
}

/// One system + user exchange sent to a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Overrides the client's default model when set
    pub model: Option<String>,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: PromptPair, temperature: f32) -> Self {
        Self {
            model: None,
            system: prompt.system,
            user: prompt.user,
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that can turn a prompt into generated text
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<T: CompletionClient> CompletionClient for &T {
    fn complete(&self, request: &CompletionRequest) -> impl Future<Output = Result<String, LlmError>> + Send {
        (**self).complete(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Http("connection reset".into()).is_retryable());
        assert!(LlmError::Timeout("120s".into()).is_retryable());
        assert!(LlmError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(LlmError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(!LlmError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!LlmError::Config("missing key".into()).is_retryable());
        assert!(!LlmError::Unexpected("no choices".into()).is_retryable());
    }

    #[test]
    fn test_request_builder() {
        let prompt = PromptPair::new("sys", "usr");
        let request = CompletionRequest::new(prompt, 0.3)
            .with_model("llama-3.3-70b-versatile")
            .with_max_tokens(6000);
        assert_eq!(request.system, "sys");
        assert_eq!(request.user, "usr");
        assert_eq!(request.model.as_deref(), Some("llama-3.3-70b-versatile"));
        assert_eq!(request.max_tokens, Some(6000));
    }

    #[test]
    fn test_error_serializes_as_message() {
        let json = serde_json::to_string(&LlmError::Config("GROQ_API_KEY not set".into())).unwrap();
        assert_eq!(json, "\"LLM configuration error: GROQ_API_KEY not set\"");
    }
}
