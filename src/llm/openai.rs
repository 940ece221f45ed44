//! OpenAI-compatible Chat Client
//!
//! Talks to any `/chat/completions` endpoint (Groq, OpenAI, a local
//! Ollama). The API key is read once from the environment variable named in
//! the config.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info};

use super::client::{CompletionClient, CompletionRequest, LlmError};
use crate::retry::{with_retry, RetryPolicy};

pub const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_NOTES_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_HYDE_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Chat endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Environment variable holding the bearer key
    pub api_key_env: String,
    /// Model for unit notes
    pub notes_model: String,
    /// Model for HyDE passages, topic parsing and single-topic notes
    pub hyde_model: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            notes_model: DEFAULT_NOTES_MODEL.to_string(),
            hyde_model: DEFAULT_HYDE_MODEL.to_string(),
            timeout_secs: 120,
            retry: RetryPolicy::default(),
        }
    }
}

impl LlmConfig {
    /// Local servers (Ollama, llama.cpp) don't need a key
    pub fn is_local(&self) -> bool {
        self.base_url.contains("://localhost") || self.base_url.contains("://127.0.0.1")
    }
}

/// HTTP chat-completion client
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    retry: RetryPolicy,
}

impl ChatClient {
    /// Build a client, reading the API key from `config.api_key_env`
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = match env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ if config.is_local() => None,
            Ok(_) => {
                return Err(LlmError::Config(format!("API key env var {} is empty", config.api_key_env)));
            }
            Err(_) => {
                return Err(LlmError::Config(format!("API key env var {} is not set", config.api_key_env)));
            }
        };
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: config.notes_model.clone(),
            retry: config.retry.clone(),
        })
    }

    async fn send_once(&self, body: &Value) -> Result<String, LlmError> {
        let mut req = self.http.post(format!("{}/chat/completions", self.base_url)).json(body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Chat completion HTTP error");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: Value = resp.json().await.map_err(|e| LlmError::Unexpected(e.to_string()))?;
        parse_completion(&payload)
    }
}

impl CompletionClient for ChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let body = build_request_body(model, request);

        debug!(model = %model, temperature = request.temperature, "Sending chat completion");
        let text = with_retry(&self.retry, "chat_completion", || self.send_once(&body)).await?;
        info!(model = %model, chars = text.chars().count(), "Chat completion received");
        Ok(text)
    }
}

/// JSON body for `POST /chat/completions`
pub fn build_request_body(model: &str, request: &CompletionRequest) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
        "temperature": request.temperature,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    body
}

/// Pull `choices[0].message.content` out of a completion response
pub fn parse_completion(payload: &Value) -> Result<String, LlmError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::Unexpected("No content in first choice".to_string()))
}
