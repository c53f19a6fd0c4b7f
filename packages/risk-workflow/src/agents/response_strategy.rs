//! Response strategist: maps assessed risks onto the company's risk appetite.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{lock, RESPONSE_STRATEGY_AGENT};
use crate::policy::{ControlLibrary, RiskAppetite};

const SYSTEM_MESSAGE: &str = r#"You are the Response Strategy Agent.
When given a prioritised list of assessed risks, you propose a response for each one: Avoid, Mitigate, Transfer or Accept.
Base each choice on the company's risk appetite for the risk's category and level, suggest concrete controls from the control library where they fit, and explain the choice briefly.
You only respond to requests and never start a conversation yourself.
Output format:
{
  "source": "Response_Strategy_Agent",
  "type": "ResponseStrategies",
  "strategies": {
    "RISK-001": {
      "suggested_strategy": "Mitigate",
      "control_suggestions": ["Regular Data Backups (CTRL-OP-02)"],
      "rationale": "..."
    }
  }
}"#;

const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AssessmentSummary {
    /// Low, Medium, High or Critical
    #[serde(default)]
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PrioritizedRisk {
    #[serde(default)]
    pub risk_id: Option<String>,
    /// Operational, Financial, Reputational, Compliance, ...
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assessment: Option<AssessmentSummary>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResponseStrategyArgs {
    /// Assessed risks, highest priority first
    pub prioritized_risks: Vec<PrioritizedRisk>,
    /// Replaces the configured risk appetite for this call only
    #[serde(default)]
    pub risk_appetite: Option<RiskAppetite>,
    /// Replaces the configured control library for this call only
    #[serde(default)]
    pub control_library: Option<ControlLibrary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecommendation {
    pub suggested_strategy: String,
    pub control_suggestions: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStrategies {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub strategies: BTreeMap<String, StrategyRecommendation>,
}

pub struct DevelopResponseStrategies {
    source: String,
    appetite: RiskAppetite,
    controls: ControlLibrary,
    rng: Mutex<StdRng>,
}

impl DevelopResponseStrategies {
    pub fn new(source: impl Into<String>, appetite: RiskAppetite, controls: ControlLibrary, rng: StdRng) -> Self {
        Self {
            source: source.into(),
            appetite,
            controls,
            rng: Mutex::new(rng),
        }
    }

    fn recommend(
        &self,
        risk: &PrioritizedRisk,
        level: &str,
        appetite: &RiskAppetite,
        controls: &ControlLibrary,
    ) -> StrategyRecommendation {
        let category = risk.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        let guidance = appetite.guidance(category, level);

        let options: Vec<&str> = guidance.split('/').map(str::trim).collect();
        let mut strategy = options
            .choose(&mut *lock(&self.rng))
            .copied()
            .unwrap_or("Accept")
            .to_string();

        if level == "Low" && strategy != "Accept" && !appetite.has_explicit(category, "Low") {
            debug!(category, "Low risk without explicit appetite, accepting");
            strategy = "Accept".to_string();
        }

        let control_suggestions: Vec<String> = match strategy.as_str() {
            "Mitigate" => suggest_controls(controls, category, risk.description.as_deref()),
            "Transfer" => vec![
                "Explore relevant insurance options".into(),
                "Assess outsourcing possibilities".into(),
                "Review contractual risk transfer clauses".into(),
            ],
            "Avoid" => vec![
                "Evaluate ceasing the associated activity".into(),
                "Re-scope project/process to eliminate risk source".into(),
                "Reject the proposed initiative".into(),
            ],
            "Accept" => vec![
                "Acknowledge risk and monitor".into(),
                "Allocate contingency budget if applicable".into(),
            ],
            _ => Vec::new(),
        };

        let mut rationale = format!(
            "Risk level assessed as '{}' for '{}' category. Company risk appetite suggests '{}'. Primary strategy chosen: {}.",
            level, category, guidance, strategy
        );
        if strategy == "Accept" {
            rationale.push_str(" Risk accepted based on level and appetite.");
        } else if !control_suggestions.is_empty() {
            rationale.push_str(&format!(" Suggested actions focus on {} the risk.", gerund(&strategy)));
        }

        StrategyRecommendation {
            suggested_strategy: strategy,
            control_suggestions,
            rationale,
        }
    }
}

#[async_trait]
impl Tool for DevelopResponseStrategies {
    const NAME: &'static str = "develop_response_strategies";
    type Args = ResponseStrategyArgs;
    type Output = ResponseStrategies;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Develop response strategies (Avoid, Mitigate, Transfer, Accept) with suggested controls for prioritized risks"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(agent = %self.source, risks = args.prioritized_risks.len(), "Developing response strategies");

        let appetite = args
            .risk_appetite
            .as_ref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.appetite);
        let controls = args
            .control_library
            .as_ref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.controls);

        let mut strategies = BTreeMap::new();
        for risk in &args.prioritized_risks {
            let Some(risk_id) = risk.risk_id.as_deref().filter(|id| !id.is_empty()) else {
                warn!(agent = %self.source, "Skipping risk without risk_id");
                continue;
            };
            let Some(level) = risk.assessment.as_ref().and_then(|a| a.risk_level.as_deref()) else {
                warn!(agent = %self.source, risk_id, "Skipping risk without an assessed level");
                continue;
            };

            strategies.insert(risk_id.to_string(), self.recommend(risk, level, appetite, controls));
        }

        info!(agent = %self.source, strategies = strategies.len(), "Response strategies ready");
        Ok(ResponseStrategies {
            source: self.source.clone(),
            kind: "ResponseStrategies".to_string(),
            strategies,
        })
    }
}

/// Up to two library controls rated High or Medium, or generic suggestions.
fn suggest_controls(library: &ControlLibrary, category: &str, description: Option<&str>) -> Vec<String> {
    let suggestions: Vec<String> = library
        .controls(category)
        .iter()
        .filter(|c| matches!(c.effectiveness.as_str(), "High" | "Medium"))
        .take(2)
        .map(|c| format!("{} ({})", c.name, c.id))
        .collect();

    if !suggestions.is_empty() {
        return suggestions;
    }

    vec![
        format!("Implement enhanced monitoring for {} risks", category),
        format!("Develop contingency plan for {}", description.unwrap_or("this risk")),
    ]
}

fn gerund(strategy: &str) -> String {
    match strategy {
        "Mitigate" => "mitigating".to_string(),
        "Transfer" => "transferring".to_string(),
        "Avoid" => "avoiding".to_string(),
        other => format!("{}ing", other.to_lowercase()),
    }
}

pub fn agent(
    model: Arc<dyn ChatModel>,
    appetite: RiskAppetite,
    controls: ControlLibrary,
    rng: StdRng,
) -> AssistantAgent {
    AssistantAgent::new(RESPONSE_STRATEGY_AGENT, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Proposes avoid, mitigate, transfer or accept strategies and controls")
        .tool(DevelopResponseStrategies::new(
            RESPONSE_STRATEGY_AGENT,
            appetite,
            controls,
            rng,
        ))
}
