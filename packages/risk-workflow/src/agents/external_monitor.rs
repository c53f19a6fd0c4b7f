//! External environment monitor: PESTLE signals.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

use super::{SignalReport, EXTERNAL_ENVIRONMENT_MONITOR};

const SYSTEM_MESSAGE: &str = r#"You are the External Environment Monitor.
When asked, you review the external environment for emerging risks using a PESTLE lens: political, economic, social, technological, legal and environmental factors.
Draw on news feeds, regulatory updates and economic indicators, and report each signal with its category.
You only respond to requests and never start a conversation yourself.
Output format:
{
  "source": "External_Environment_Monitor",
  "type": "ExternalRiskSignals",
  "data": {
    "economic": ["..."],
    "political": ["..."],
    "social": ["..."],
    "technological": ["..."],
    "legal": ["..."],
    "environmental": []
  }
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSignals {
    pub economic: Vec<String>,
    pub political: Vec<String>,
    pub social: Vec<String>,
    pub technological: Vec<String>,
    pub legal: Vec<String>,
    pub environmental: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct MonitorExternalArgs {}

pub struct MonitorExternalEnvironment {
    source: String,
}

impl MonitorExternalEnvironment {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

#[async_trait]
impl Tool for MonitorExternalEnvironment {
    const NAME: &'static str = "monitor_external_environment";
    type Args = MonitorExternalArgs;
    type Output = SignalReport<ExternalSignals>;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Monitor the external environment (PESTLE factors) for emerging risk signals"
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(agent = %self.source, "Monitoring external environment");

        let data = ExternalSignals {
            economic: vec![
                "Example economic signal: Rising inflation forecast affecting consumer spending.".into(),
            ],
            political: vec![
                "Example political signal: New proposed industry regulation impacting operations.".into(),
            ],
            social: vec![
                "Example social trend: Negative sentiment spike regarding industry environmental practices."
                    .into(),
            ],
            technological: vec![
                "Example technological signal: Emergence of a competing technology.".into(),
            ],
            legal: vec![
                "Example legal signal: Upcoming data privacy law changes requiring compliance updates."
                    .into(),
            ],
            environmental: Vec::new(),
        };

        Ok(SignalReport::new(&self.source, "ExternalRiskSignals", data))
    }
}

pub fn agent(model: Arc<dyn ChatModel>) -> AssistantAgent {
    AssistantAgent::new(EXTERNAL_ENVIRONMENT_MONITOR, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Monitors political, economic, social, technological, legal and environmental signals")
        .tool(MonitorExternalEnvironment::new(EXTERNAL_ENVIRONMENT_MONITOR))
}
