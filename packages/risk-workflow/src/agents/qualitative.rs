//! Qualitative risk assessor: likelihood/impact matrix and simple rules.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::{lock, QUALITATIVE_RISK_ASSESSOR};
use crate::policy::{RiskLevel, RiskMatrix};

const SYSTEM_MESSAGE: &str = r#"You are the Qualitative Risk Assessor.
When asked, you assess risks that are hard to quantify, such as reputational, strategic or compliance risks.
You judge likelihood and impact with a risk matrix ("RiskMatrix") or apply expert rules ("RuleBased"), using the description, category, contributing factors and potential impact you are given.
Report the likelihood, impact and resulting risk level (Low, Medium, High, Critical) with a short justification.
You only respond to requests and never start a conversation yourself.
Output format:
{
  "source": "Qualitative_Risk_Assessor",
  "type": "QualitativeAssessment",
  "risk_id": "RISK-001",
  "assessment_method_used": "RiskMatrix",
  "assessment": {"likelihood": "Medium", "impact": "Major", "risk_level": "High", "justification": "..."}
}"#;

const DEFAULT_METHOD: &str = "RiskMatrix";

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QualitativeArgs {
    /// Identifier of the risk, e.g. RISK-001
    pub risk_id: String,
    /// description, category, contributing_factors, potential_impact_description
    #[serde(default)]
    pub risk_info: Map<String, Value>,
    /// RiskMatrix (default) or RuleBased
    #[serde(default = "default_method")]
    pub assessment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixAssessment {
    pub likelihood: String,
    pub impact: String,
    /// A matrix level, or "Undefined" when the map has no entry
    pub risk_level: String,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAssessment {
    pub triggered_rules: Vec<String>,
    pub risk_level: RiskLevel,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assessment {
    Matrix(MatrixAssessment),
    Rules(RuleAssessment),
    Failed { error: String },
}

impl Assessment {
    pub fn risk_level(&self) -> Option<&str> {
        match self {
            Assessment::Matrix(m) => Some(&m.risk_level),
            Assessment::Rules(r) => Some(r.risk_level.as_str()),
            Assessment::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeAssessment {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub risk_id: String,
    pub assessment_method_used: String,
    pub assessment: Assessment,
}

pub struct PerformQualitativeAssessment {
    source: String,
    matrix: RiskMatrix,
    rng: Mutex<StdRng>,
}

impl PerformQualitativeAssessment {
    pub fn new(source: impl Into<String>, matrix: RiskMatrix, rng: StdRng) -> Self {
        Self {
            source: source.into(),
            matrix,
            rng: Mutex::new(rng),
        }
    }

    fn apply_matrix(&self, risk_info: &Map<String, Value>) -> Result<MatrixAssessment, String> {
        let (l_idx, i_idx) = {
            let mut rng = lock(&self.rng);
            let l = (0..self.matrix.likelihood_scale.len()).collect::<Vec<_>>();
            let i = (0..self.matrix.impact_scale.len()).collect::<Vec<_>>();
            match (l.choose(&mut *rng), i.choose(&mut *rng)) {
                (Some(&l), Some(&i)) => (l, i),
                _ => return Err("risk matrix scales are empty".to_string()),
            }
        };

        let likelihood = self.matrix.likelihood_scale[l_idx].clone();
        let impact = self.matrix.impact_scale[i_idx].clone();
        let risk_level = self
            .matrix
            .level(l_idx, i_idx)
            .map(|level| level.to_string())
            .unwrap_or_else(|| "Undefined".to_string());

        let mut justification = format!(
            "Assessed based on general understanding. Likelihood estimated as {}, Impact as {}.",
            likelihood, impact
        );
        if let Some(factors) = risk_info.get("contributing_factors") {
            justification.push_str(&format!(" Factors considered: {}.", join_values(factors)));
        }
        if let Some(description) = risk_info.get("potential_impact_description") {
            justification.push_str(&format!(" Potential Impact: {}.", plain(description)));
        }

        Ok(MatrixAssessment {
            likelihood,
            impact,
            risk_level,
            justification,
        })
    }
}

#[async_trait]
impl Tool for PerformQualitativeAssessment {
    const NAME: &'static str = "perform_qualitative_assessment";
    type Args = QualitativeArgs;
    type Output = QualitativeAssessment;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Perform a qualitative risk assessment (RiskMatrix or RuleBased) for one identified risk"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(
            agent = %self.source,
            risk_id = %args.risk_id,
            method = %args.assessment_method,
            "Qualitative assessment requested"
        );

        let method = args.assessment_method;
        let (method_used, outcome) = match method.to_uppercase().as_str() {
            "RISKMATRIX" => (method.clone(), self.apply_matrix(&args.risk_info).map(Assessment::Matrix)),
            "RULEBASED" => (method.clone(), Ok(Assessment::Rules(apply_rules(&args.risk_info)))),
            _ => {
                warn!(agent = %self.source, method = %method, "Unsupported assessment method, using risk matrix");
                (
                    format!("{} (Defaulted)", DEFAULT_METHOD),
                    self.apply_matrix(&args.risk_info).map(Assessment::Matrix),
                )
            }
        };

        let (method_used, assessment) = match outcome {
            Ok(assessment) => (method_used, assessment),
            Err(e) => {
                warn!(agent = %self.source, risk_id = %args.risk_id, error = %e, "Assessment failed");
                (
                    format!("{}_Failed", method),
                    Assessment::Failed {
                        error: format!("An error occurred during assessment: {}", e),
                    },
                )
            }
        };

        Ok(QualitativeAssessment {
            source: self.source.clone(),
            kind: "QualitativeAssessment".to_string(),
            risk_id: args.risk_id,
            assessment_method_used: method_used,
            assessment,
        })
    }
}

/// Keyword rules; later rules override earlier ones.
pub fn apply_rules(risk_info: &Map<String, Value>) -> RuleAssessment {
    let category = risk_info.get("category").and_then(Value::as_str).unwrap_or("");
    let description = risk_info
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();

    let mut assessment = RuleAssessment {
        triggered_rules: Vec::new(),
        risk_level: RiskLevel::Low,
        justification: "No specific rules triggered.".to_string(),
    };

    if category == "Operational" && description.contains("outage") {
        assessment.triggered_rules.push("Rule_OperationalOutage".into());
        assessment.risk_level = RiskLevel::Medium;
        assessment.justification = "Rule triggered for potential operational outage.".into();
    }
    if description.contains("compliance") || category == "Compliance" {
        assessment.triggered_rules.push("Rule_ComplianceMention".into());
        assessment.risk_level = RiskLevel::High;
        assessment.justification = "Rule triggered due to compliance keyword or category.".into();
    }

    assessment
}

pub fn agent(model: Arc<dyn ChatModel>, matrix: RiskMatrix, rng: StdRng) -> AssistantAgent {
    AssistantAgent::new(QUALITATIVE_RISK_ASSESSOR, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Rates likelihood, impact and level of hard-to-quantify risks")
        .tool(PerformQualitativeAssessment::new(QUALITATIVE_RISK_ASSESSOR, matrix, rng))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_values(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        other => plain(other),
    }
}
