use anyhow::{anyhow, bail, Context, Result};
use dotenvy::dotenv;
use group_chat::{HumanInputMode, SpeakerSelection, DEFAULT_MAX_ROUND};
use llm_client::{config_list_from_json, LlmConfig};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::policy::RiskPolicy;

/// Variable (or file name) holding the JSON config list.
pub const CONFIG_LIST_ENV: &str = "OAI_CONFIG_LIST";

/// Models the workflow is prompted for.
pub const SUPPORTED_MODELS: [&str; 4] = ["gpt-4", "gpt-4-turbo", "gpt-4o", "gpt-3.5-turbo"];

const DEFAULT_CACHE_SEED: u64 = 42;
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub session: SessionSettings,
    pub policy: RiskPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config_list = config_list_from_json(CONFIG_LIST_ENV, &SUPPORTED_MODELS).with_context(|| {
            format!(
                "{} must be set to a JSON config list (or a path to one) with at least one of {:?}",
                CONFIG_LIST_ENV, SUPPORTED_MODELS
            )
        })?;

        let session = SessionSettings::from_lookup(|key| env::var(key).ok())?;
        let policy = load_policy(session.policy_file.as_deref())?;

        let llm = LlmConfig::new(config_list)
            .with_cache_seed(session.cache_seed)
            .with_temperature(session.temperature);

        Ok(Self { llm, session, policy })
    }
}

/// Everything except the endpoints and the policy itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub cache_seed: Option<u64>,
    pub temperature: Option<f32>,
    pub max_round: usize,
    pub speaker_selection: SpeakerSelection,
    pub human_input_mode: HumanInputMode,
    pub policy_file: Option<PathBuf>,
}

impl SessionSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cache_seed = match lookup("RISK_CACHE_SEED") {
            None => Some(DEFAULT_CACHE_SEED),
            Some(value) if matches!(value.trim().to_ascii_lowercase().as_str(), "none" | "off" | "") => None,
            Some(value) => Some(
                value
                    .trim()
                    .parse()
                    .context("RISK_CACHE_SEED must be an integer or 'none'")?,
            ),
        };

        let temperature = lookup("RISK_TEMPERATURE")
            .unwrap_or_else(|| DEFAULT_TEMPERATURE.to_string())
            .trim()
            .parse::<f32>()
            .context("RISK_TEMPERATURE must be a number")?;

        let max_round = lookup("RISK_MAX_ROUND")
            .unwrap_or_else(|| DEFAULT_MAX_ROUND.to_string())
            .trim()
            .parse::<usize>()
            .context("RISK_MAX_ROUND must be a positive integer")?;
        if max_round == 0 {
            bail!("RISK_MAX_ROUND must be at least 1");
        }

        let speaker_selection = lookup("RISK_SPEAKER_SELECTION")
            .unwrap_or_else(|| "auto".to_string())
            .parse::<SpeakerSelection>()
            .map_err(|e| anyhow!(e))
            .context("RISK_SPEAKER_SELECTION must be auto, round_robin or hub")?;

        let human_input_mode = lookup("RISK_HUMAN_INPUT_MODE")
            .unwrap_or_else(|| "terminate".to_string())
            .parse::<HumanInputMode>()
            .map_err(|e| anyhow!(e))
            .context("RISK_HUMAN_INPUT_MODE must be always, terminate or never")?;

        let policy_file = lookup("RISK_POLICY_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            cache_seed,
            temperature: Some(temperature),
            max_round,
            speaker_selection,
            human_input_mode,
            policy_file,
        })
    }
}

/// Built-in policy, or the file's sections layered over it.
pub fn load_policy(path: Option<&Path>) -> Result<RiskPolicy> {
    let Some(path) = path else {
        return Ok(RiskPolicy::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read risk policy file {}", path.display()))?;
    let policy = RiskPolicy::from_json(&json)
        .with_context(|| format!("Invalid risk policy file {}", path.display()))?;

    info!(
        path = %path.display(),
        categories = policy.risk_appetite.0.len(),
        kris = policy.kri_definitions.len(),
        "Loaded risk policy"
    );
    Ok(policy)
}
