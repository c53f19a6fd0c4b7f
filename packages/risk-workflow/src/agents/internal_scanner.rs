//! Internal data scanner: financial systems, operations and employee feedback.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

use super::{SignalReport, INTERNAL_DATA_SCANNER};

const SYSTEM_MESSAGE: &str = r#"You are the Internal Data Scanner.
When asked, you scan internal company sources such as financial systems, operational databases and employee feedback platforms.
You look for risk signals and anomalies and report them in a structured form, naming the source and nature of each signal.
You only cover internal sources and you never start a conversation yourself.
Output format:
{
  "source": "Internal_Data_Scanner",
  "type": "InternalRiskSignals",
  "data": {
    "financial_anomalies": ["..."],
    "operational_issues": ["..."],
    "employee_concerns": ["..."]
  }
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalSignals {
    pub financial_anomalies: Vec<String>,
    pub operational_issues: Vec<String>,
    pub employee_concerns: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ScanInternalDataArgs {}

pub struct ScanInternalData {
    source: String,
}

impl ScanInternalData {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

#[async_trait]
impl Tool for ScanInternalData {
    const NAME: &'static str = "scan_internal_data";
    type Args = ScanInternalDataArgs;
    type Output = SignalReport<InternalSignals>;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Scan internal data sources (financial systems, operational logs, employee feedback) for risk signals"
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(agent = %self.source, "Scanning internal data sources");

        // Placeholder findings until real data connections exist
        let data = InternalSignals {
            financial_anomalies: vec!["Example financial anomaly: High expense variance in Q1".into()],
            operational_issues: vec![
                "Example operational issue: Increased server error rate (5%)".into(),
            ],
            employee_concerns: vec![
                "Example employee concern: Multiple mentions of 'compliance shortcut'".into(),
            ],
        };

        Ok(SignalReport::new(&self.source, "InternalRiskSignals", data))
    }
}

pub fn agent(model: Arc<dyn ChatModel>) -> AssistantAgent {
    AssistantAgent::new(INTERNAL_DATA_SCANNER, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Scans internal company data for risk signals")
        .tool(ScanInternalData::new(INTERNAL_DATA_SCANNER))
}
