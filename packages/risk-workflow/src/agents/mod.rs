//! The seven specialist agents and their callable functions.
//!
//! Each specialist is an [`AssistantAgent`] with a role prompt and one or more
//! [`llm_client::Tool`] implementations. The tools return placeholder data that
//! stands in for real data connections and models.
//!
//! [`AssistantAgent`]: group_chat::AssistantAgent

pub mod external_monitor;
pub mod internal_scanner;
pub mod market_analyst;
pub mod monitoring;
pub mod qualitative;
pub mod quantitative;
pub mod response_strategy;

use group_chat::ConversableAgent;
use llm_client::ChatModel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::policy::RiskPolicy;

pub use monitoring::MonitoringService;

pub const INTERNAL_DATA_SCANNER: &str = "Internal_Data_Scanner";
pub const EXTERNAL_ENVIRONMENT_MONITOR: &str = "External_Environment_Monitor";
pub const MARKET_INDUSTRY_ANALYST: &str = "Market_Industry_Analyst";
pub const QUANTITATIVE_RISK_ASSESSOR: &str = "Quantitative_Risk_Assessor";
pub const QUALITATIVE_RISK_ASSESSOR: &str = "Qualitative_Risk_Assessor";
pub const RESPONSE_STRATEGY_AGENT: &str = "Response_Strategy_Agent";
pub const MONITORING_REPORTING_AGENT: &str = "Monitoring_Reporting_Agent";

/// Roster order of the specialists.
pub const SPECIALIST_NAMES: [&str; 7] = [
    INTERNAL_DATA_SCANNER,
    EXTERNAL_ENVIRONMENT_MONITOR,
    MARKET_INDUSTRY_ANALYST,
    QUANTITATIVE_RISK_ASSESSOR,
    QUALITATIVE_RISK_ASSESSOR,
    RESPONSE_STRATEGY_AGENT,
    MONITORING_REPORTING_AGENT,
];

/// `{source, type, data}` envelope shared by the scanning and reporting functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport<T> {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: T,
}

impl<T> SignalReport<T> {
    pub fn new(source: &str, kind: impl Into<String>, data: T) -> Self {
        Self {
            source: source.to_string(),
            kind: kind.into(),
            data,
        }
    }
}

/// The specialist agents plus a handle on the monitoring registry.
pub struct Specialists {
    pub agents: Vec<Arc<dyn ConversableAgent>>,
    pub monitoring: Arc<MonitoringService>,
}

/// Build all seven specialists against one model and policy.
///
/// `seed` makes the synthetic data reproducible; `None` draws from entropy.
pub fn specialists(model: Arc<dyn ChatModel>, policy: &RiskPolicy, seed: Option<u64>) -> Specialists {
    let monitoring = Arc::new(MonitoringService::new(
        MONITORING_REPORTING_AGENT,
        policy.kri_definitions.clone(),
        seeded_rng(seed, 4),
    ));

    let agents: Vec<Arc<dyn ConversableAgent>> = vec![
        Arc::new(internal_scanner::agent(model.clone())),
        Arc::new(external_monitor::agent(model.clone())),
        Arc::new(market_analyst::agent(model.clone())),
        Arc::new(quantitative::agent(model.clone(), seeded_rng(seed, 1))),
        Arc::new(qualitative::agent(
            model.clone(),
            policy.risk_matrix.clone(),
            seeded_rng(seed, 2),
        )),
        Arc::new(response_strategy::agent(
            model.clone(),
            policy.risk_appetite.clone(),
            policy.control_library.clone(),
            seeded_rng(seed, 3),
        )),
        Arc::new(monitoring::agent(model, monitoring.clone())),
    ];

    Specialists { agents, monitoring }
}

/// One independent stream per stochastic specialist.
pub(crate) fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole numbers print without a fractional part.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Tool state is only touched synchronously, so a poisoned lock still holds usable data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
