//! LLM endpoint configuration.
//!
//! A config list is a JSON array of endpoint entries, each with at least a `model`
//! and an `api_key`:
//!
//! ```json
//! [
//!   {"model": "gpt-4o", "api_key": "sk-..."},
//!   {"model": "gpt-4", "api_key": "...", "base_url": "https://example.openai.azure.com",
//!    "api_type": "azure", "api_version": "2024-02-01"}
//! ]
//! ```
//!
//! The list is read from an environment variable whose value is either the JSON
//! itself or a path to a JSON file; when the variable is unset a file with the
//! same name in the working directory is used.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LlmError, Result};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// One LLM endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfigEntry {
    pub model: String,

    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// `openai` (default) or `azure`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,

    /// Required by Azure deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl LlmConfigEntry {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
            api_type: None,
            api_version: None,
        }
    }

    pub fn is_azure(&self) -> bool {
        self.api_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("azure"))
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

// Keep API keys out of logs.
impl std::fmt::Debug for LlmConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfigEntry")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_type", &self.api_type)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Complete LLM configuration shared by every model-backed participant.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Endpoints, tried in order
    pub config_list: Vec<LlmConfigEntry>,

    /// Seed for the on-disk response cache; `None` disables caching
    pub cache_seed: Option<u64>,

    /// Default sampling temperature
    pub temperature: Option<f32>,
}

impl LlmConfig {
    pub fn new(config_list: Vec<LlmConfigEntry>) -> Self {
        Self {
            config_list,
            cache_seed: Some(42),
            temperature: Some(0.1),
        }
    }

    pub fn with_cache_seed(mut self, seed: Option<u64>) -> Self {
        self.cache_seed = seed;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Parse a JSON config list.
pub fn parse_config_list(json: &str) -> Result<Vec<LlmConfigEntry>> {
    serde_json::from_str(json)
        .map_err(|e| LlmError::Config(format!("Invalid config list JSON: {}", e)))
}

/// Keep only entries whose model is in `models`. An empty filter keeps everything.
pub fn filter_config_list(entries: Vec<LlmConfigEntry>, models: &[&str]) -> Vec<LlmConfigEntry> {
    if models.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| models.contains(&entry.model.as_str()))
        .collect()
}

/// Load a config list from the environment variable `env_or_file`, falling back to a
/// file named `env_or_file` in the working directory, then filter by model.
///
/// Fails when nothing is found, the JSON is malformed, or no entry survives filtering.
pub fn config_list_from_json(env_or_file: &str, models: &[&str]) -> Result<Vec<LlmConfigEntry>> {
    let raw = match std::env::var(env_or_file) {
        Ok(value) => resolve_env_value(&value)?,
        Err(_) => {
            debug!(file = env_or_file, "Config list variable unset, reading file");
            read_file(Path::new(env_or_file))?
        }
    };

    let entries = parse_config_list(&raw)?;
    let total = entries.len();
    let entries = filter_config_list(entries, models);

    if entries.is_empty() {
        return Err(LlmError::Config(format!(
            "{} has no usable entries ({} before filtering by models {:?})",
            env_or_file, total, models
        )));
    }

    info!(
        source = env_or_file,
        entries = entries.len(),
        models = ?entries.iter().map(|e| e.model.as_str()).collect::<Vec<_>>(),
        "Loaded LLM config list"
    );

    Ok(entries)
}

/// The variable may hold JSON text or a path to a JSON file.
fn resolve_env_value(value: &str) -> Result<String> {
    let trimmed = value.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Ok(value.to_string());
    }
    read_file(Path::new(value.trim()))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        LlmError::Config(format!(
            "Failed to read config list at {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIST: &str = r#"[
        {"model": "gpt-4o", "api_key": "sk-one"},
        {"model": "llama-3", "api_key": "sk-two", "base_url": "http://localhost:8000/v1/"},
        {"model": "gpt-4", "api_key": "az", "api_type": "azure", "api_version": "2024-02-01"}
    ]"#;

    #[test]
    fn test_parse_and_filter() {
        let entries = parse_config_list(LIST).unwrap();
        assert_eq!(entries.len(), 3);

        let filtered = filter_config_list(entries, &["gpt-4", "gpt-4o"]);
        let models: Vec<&str> = filtered.iter().map(|e| e.model.as_str()).collect();
        assert_eq!(models, vec!["gpt-4o", "gpt-4"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let entries = parse_config_list(LIST).unwrap();
        assert_eq!(filter_config_list(entries, &[]).len(), 3);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = parse_config_list(r#"[{"model": "gpt-4o"}]"#).unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));
    }

    #[test]
    fn test_base_url_defaults_and_trims() {
        let entries = parse_config_list(LIST).unwrap();
        assert_eq!(entries[0].base_url(), DEFAULT_BASE_URL);
        assert_eq!(entries[1].base_url(), "http://localhost:8000/v1");
        assert!(entries[2].is_azure());
        assert!(!entries[0].is_azure());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let entry = LlmConfigEntry::new("gpt-4o", "sk-secret");
        let debug = format!("{:?}", entry);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_env_value_may_be_a_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LIST.as_bytes()).unwrap();

        let raw = resolve_env_value(file.path().to_str().unwrap()).unwrap();
        assert_eq!(parse_config_list(&raw).unwrap().len(), 3);
    }

    #[test]
    fn test_env_value_may_be_inline_json() {
        let raw = resolve_env_value(LIST).unwrap();
        assert_eq!(raw, LIST);
    }

    #[test]
    fn test_nothing_left_after_filtering_is_an_error() {
        let var = "LLM_CLIENT_TEST_CONFIG_LIST_FILTERED";
        std::env::set_var(var, r#"[{"model": "llama-3", "api_key": "k"}]"#);

        let err = config_list_from_json(var, &["gpt-4o"]).unwrap_err();
        assert!(matches!(err, LlmError::Config(_)));

        std::env::remove_var(var);
    }
}
