//! Application Configuration
//!
//! JSON config at `<config_dir>/syllabus-gpt/config.json`. Every field has a
//! default, so a missing file or a partial one is fine.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::chroma::ChromaConfig;
use crate::context::{RetrievalBudget, DEFAULT_TOP_K};
use crate::llm::LlmConfig;
use crate::notes::PipelineSettings;

const APP_DIR: &str = "syllabus-gpt";
const CONFIG_FILE: &str = "config.json";

pub const ENV_LLM_URL: &str = "SYLLABUS_GPT_LLM_URL";
pub const ENV_CHROMA_URL: &str = "SYLLABUS_GPT_CHROMA_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Serialize for ConfigError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub chroma: ChromaConfig,
    pub budget: RetrievalBudget,
    /// Passages requested per unit when the caller doesn't say
    pub default_top_k: u32,
    pub max_concurrent_units: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            chroma: ChromaConfig::default(),
            budget: RetrievalBudget::default(),
            default_top_k: DEFAULT_TOP_K,
            max_concurrent_units: 1,
        }
    }
}

impl AppConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            notes_model: self.llm.notes_model.clone(),
            hyde_model: self.llm.hyde_model.clone(),
            budget: self.budget.clone(),
            max_concurrent_units: self.max_concurrent_units.max(1),
        }
    }

    /// Apply URL overrides from `lookup` (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_LLM_URL).filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "LLM URL overridden from environment");
            self.llm.base_url = url;
        }
        if let Some(url) = lookup(ENV_CHROMA_URL).filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "Chroma URL overridden from environment");
            self.chroma.base_url = url;
        }
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Read a config file, falling back to defaults when it doesn't exist
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load config from `path` (or the default location) plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    let mut config = read_config(&path)?;
    config.apply_overrides(|key| env::var(key).ok());
    Ok(config)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    atomic_write(path, &content)?;
    info!(path = %path.display(), "Saved config");
    Ok(())
}

fn atomic_write(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = read_config(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_top_k, 40);
        assert_eq!(config.max_concurrent_units, 1);
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn test_save_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.chroma.past_exam_collection = "previous_papers".to_string();
        config.max_concurrent_units = 3;

        save_config(&path, &config).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_camel_case_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"llm": {"notesModel": "gpt-4o"}, "budget": {"truncatePastExam": true}, "defaultTopK": 30}"#,
        )
        .unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.llm.notes_model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert!(config.budget.truncate_past_exam);
        assert_eq!(config.default_top_k, 30);
        assert_eq!(config.chroma.reference_collection, "books");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_LLM_URL, "http://localhost:11434/v1"),
            (ENV_CHROMA_URL, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.chroma.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_pipeline_settings_from_config() {
        let mut config = AppConfig::default();
        config.llm.hyde_model = "small".to_string();
        config.max_concurrent_units = 0;
        let settings = config.pipeline_settings();
        assert_eq!(settings.hyde_model, "small");
        assert_eq!(settings.max_concurrent_units, 1);
    }
}
