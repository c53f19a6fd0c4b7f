//! Monitoring and reporting: KRI thresholds, control checks and status reports.
//!
//! Unlike the other specialists this one keeps state between calls. A
//! [`MonitoringService`] owns the registry of monitored risks, KRI definitions,
//! control statuses and recent alerts; the three tools share it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use rand::rngs::StdRng;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{format_number, lock, round2, SignalReport, MONITORING_REPORTING_AGENT};
use crate::policy::KriDefinition;

const SYSTEM_MESSAGE: &str = r#"You are the Monitoring & Reporting Agent.
You keep watch over the risks the team has identified and the controls put in place for them.
When asked you register risks with their key risk indicators (KRIs) and controls, run monitoring cycles that check KRI thresholds and control effectiveness, and produce summary reports.
Report alerts and status in a structured form. You only respond to requests and never start a conversation yourself.
Example alert:
{
  "source": "Monitoring_Reporting_Agent",
  "type": "MonitoringCycleResults",
  "kri_alerts": [{"kri_id": "KRI_CPU", "risk_id": "RISK-001", "threshold": 90, "operator": ">", "current_value": 95.3, "message": "..."}],
  "control_issues": [],
  "summary": "Monitoring cycle completed with 1 KRI alert(s) and 0 control issue(s)."
}"#;

/// Alerts and issues kept for reporting.
const RECENT_ALERT_LIMIT: usize = 50;
/// Alerts and issues included in a report.
const REPORT_ALERT_LIMIT: usize = 10;
/// Probability that a control check passes.
const CONTROL_PASS_RATE: f64 = 0.95;

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlStatus {
    Effective,
    Ineffective,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredRisk {
    pub kris: Vec<String>,
    pub controls: Vec<String>,
    pub status: RiskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub status: ControlStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KriAlert {
    pub kri_id: String,
    pub risk_id: String,
    pub threshold: f64,
    pub operator: String,
    pub current_value: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlIssue {
    pub control_id: String,
    pub risk_id: String,
    pub status: ControlStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonitoringEvent {
    Kri(KriAlert),
    Control(ControlIssue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringState {
    pub monitored_risks: BTreeMap<String, MonitoredRisk>,
    pub kri_definitions: BTreeMap<String, KriDefinition>,
    pub control_effectiveness: BTreeMap<String, ControlState>,
    pub recent_alerts: Vec<MonitoringEvent>,
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSetupConfirmation {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub risk_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringCycleResults {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub kri_alerts: Vec<KriAlert>,
    pub control_issues: Vec<ControlIssue>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KriSummary {
    pub total_defined: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub total_tracked: usize,
    pub effective: usize,
    pub ineffective: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReportData {
    pub report_time: DateTime<Utc>,
    pub report_type: String,
    pub monitored_risks_summary: RiskCounts,
    pub kri_summary: KriSummary,
    pub control_effectiveness_summary: ControlSummary,
    pub recent_alerts_issues: Vec<MonitoringEvent>,
}

pub type RiskReport = SignalReport<RiskReportData>;

// =============================================================================
// Service
// =============================================================================

struct Inner {
    state: MonitoringState,
    rng: StdRng,
}

pub struct MonitoringService {
    source: String,
    inner: Mutex<Inner>,
}

impl MonitoringService {
    pub fn new(source: impl Into<String>, kri_definitions: BTreeMap<String, KriDefinition>, rng: StdRng) -> Self {
        Self {
            source: source.into(),
            inner: Mutex::new(Inner {
                state: MonitoringState {
                    kri_definitions,
                    ..Default::default()
                },
                rng,
            }),
        }
    }

    /// Copy of the current registry.
    pub fn snapshot(&self) -> MonitoringState {
        lock(&self.inner).state.clone()
    }

    /// Register a risk (or extend it) with KRIs and controls.
    pub fn setup(
        &self,
        risk_id: &str,
        kris: &[String],
        controls: &[String],
        definitions: &BTreeMap<String, KriDefinition>,
    ) -> MonitoringSetupConfirmation {
        info!(agent = %self.source, risk_id, "Setting up monitoring");

        let mut inner = lock(&self.inner);
        let state = &mut inner.state;
        let risk = state
            .monitored_risks
            .entry(risk_id.to_string())
            .or_insert_with(|| MonitoredRisk {
                kris: Vec::new(),
                controls: Vec::new(),
                status: RiskStatus::Active,
            });

        let mut added_kris = Vec::new();
        for kri_id in kris {
            if !risk.kris.contains(kri_id) {
                risk.kris.push(kri_id.clone());
                added_kris.push(kri_id.clone());
            }
        }

        let mut added_controls = Vec::new();
        for control_id in controls {
            if !risk.controls.contains(control_id) {
                risk.controls.push(control_id.clone());
                added_controls.push(control_id.clone());
            }
        }

        for kri_id in kris {
            if let Some(definition) = definitions.get(kri_id) {
                debug!(kri_id = %kri_id, "Stored KRI definition");
                state.kri_definitions.insert(kri_id.clone(), definition.clone());
            } else if !state.kri_definitions.contains_key(kri_id) {
                warn!(agent = %self.source, kri_id = %kri_id, "KRI added for monitoring without a definition");
            }
        }

        for control_id in &added_controls {
            state
                .control_effectiveness
                .entry(control_id.clone())
                .or_insert(ControlState {
                    status: ControlStatus::Unknown,
                    last_checked: None,
                });
        }

        MonitoringSetupConfirmation {
            source: self.source.clone(),
            kind: "MonitoringSetupConfirmation".to_string(),
            risk_id: risk_id.to_string(),
            status: "Success".to_string(),
            message: format!(
                "Monitoring setup for risk '{}'. Added KRIs: {}, Added Controls: {}.",
                risk_id,
                quoted_list(&added_kris),
                quoted_list(&added_controls)
            ),
        }
    }

    /// Stop monitoring a risk without forgetting it. Returns false for unknown ids.
    pub fn deactivate(&self, risk_id: &str) -> bool {
        let mut inner = lock(&self.inner);
        match inner.state.monitored_risks.get_mut(risk_id) {
            Some(risk) => {
                risk.status = RiskStatus::Inactive;
                true
            }
            None => false,
        }
    }

    /// Check every KRI and control of the active risks once.
    pub fn run_cycle(&self) -> MonitoringCycleResults {
        let timestamp = Utc::now();
        info!(agent = %self.source, %timestamp, "Running monitoring cycle");

        let mut inner = lock(&self.inner);
        let Inner { state, rng } = &mut *inner;

        let active: Vec<(&String, &MonitoredRisk)> = state
            .monitored_risks
            .iter()
            .filter(|(_, risk)| risk.status == RiskStatus::Active)
            .collect();

        let mut kri_alerts = Vec::new();
        for (risk_id, risk) in &active {
            for kri_id in &risk.kris {
                let Some(definition) = state.kri_definitions.get(kri_id) else {
                    warn!(kri_id = %kri_id, "Skipping KRI without a definition");
                    continue;
                };

                let value = uniform(rng, definition.min_val, definition.max_val);
                if definition.is_breached(value) {
                    let message = format!(
                        "KRI '{}' breached threshold ({} {}). Current value: {:.2} for Risk '{}'.",
                        kri_id,
                        definition.operator,
                        format_number(definition.threshold),
                        value,
                        risk_id
                    );
                    warn!(kri_id = %kri_id, risk_id = %risk_id, value, "KRI threshold breached");
                    kri_alerts.push(KriAlert {
                        kri_id: kri_id.clone(),
                        risk_id: risk_id.to_string(),
                        threshold: definition.threshold,
                        operator: definition.operator.clone(),
                        current_value: round2(value),
                        message,
                    });
                }
            }
        }

        let mut checked = HashSet::new();
        let mut control_checks = Vec::new();
        for (risk_id, risk) in &active {
            for control_id in &risk.controls {
                if !checked.insert(control_id.clone()) {
                    continue;
                }
                let effective = rng.gen::<f64>() < CONTROL_PASS_RATE;
                control_checks.push((control_id.clone(), risk_id.to_string(), effective));
            }
        }

        let mut control_issues = Vec::new();
        for (control_id, risk_id, effective) in control_checks {
            let status = if effective {
                ControlStatus::Effective
            } else {
                ControlStatus::Ineffective
            };
            state.control_effectiveness.insert(
                control_id.clone(),
                ControlState {
                    status,
                    last_checked: Some(timestamp),
                },
            );

            if !effective {
                warn!(control_id = %control_id, risk_id = %risk_id, "Control assessed as ineffective");
                control_issues.push(ControlIssue {
                    message: format!(
                        "Control '{}' for Risk '{}' assessed as ineffective.",
                        control_id, risk_id
                    ),
                    control_id,
                    risk_id,
                    status,
                });
            }
        }

        state
            .recent_alerts
            .extend(kri_alerts.iter().cloned().map(MonitoringEvent::Kri));
        state
            .recent_alerts
            .extend(control_issues.iter().cloned().map(MonitoringEvent::Control));
        let overflow = state.recent_alerts.len().saturating_sub(RECENT_ALERT_LIMIT);
        state.recent_alerts.drain(..overflow);

        let summary = format!(
            "Monitoring cycle completed with {} KRI alert(s) and {} control issue(s).",
            kri_alerts.len(),
            control_issues.len()
        );
        info!(agent = %self.source, "{}", summary);

        MonitoringCycleResults {
            source: self.source.clone(),
            kind: "MonitoringCycleResults".to_string(),
            timestamp,
            kri_alerts,
            control_issues,
            summary,
        }
    }

    /// Summarise the registry.
    pub fn report(&self, report_type: &str) -> RiskReport {
        info!(agent = %self.source, report_type, "Generating report");

        let inner = lock(&self.inner);
        let state = &inner.state;
        let count = |status: ControlStatus| {
            state
                .control_effectiveness
                .values()
                .filter(|c| c.status == status)
                .count()
        };
        let skip = state.recent_alerts.len().saturating_sub(REPORT_ALERT_LIMIT);

        let data = RiskReportData {
            report_time: Utc::now(),
            report_type: report_type.to_string(),
            monitored_risks_summary: RiskCounts {
                total: state.monitored_risks.len(),
                active: state
                    .monitored_risks
                    .values()
                    .filter(|r| r.status == RiskStatus::Active)
                    .count(),
            },
            kri_summary: KriSummary {
                total_defined: state.kri_definitions.len(),
            },
            control_effectiveness_summary: ControlSummary {
                total_tracked: state.control_effectiveness.len(),
                effective: count(ControlStatus::Effective),
                ineffective: count(ControlStatus::Ineffective),
                unknown: count(ControlStatus::Unknown),
            },
            recent_alerts_issues: state.recent_alerts[skip..].to_vec(),
        };

        SignalReport::new(&self.source, format!("{}RiskReport", capitalize(report_type)), data)
    }
}

/// Uniform draw over `[low, high]`, tolerating reversed or equal bounds.
fn uniform(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

/// `['a', 'b']`
fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}

/// First letter upper case, the rest lower case.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Tools
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetupMonitoringArgs {
    /// Identifier of the risk, e.g. RISK-001
    pub risk_id: String,
    /// KRI ids to watch for this risk
    #[serde(default)]
    pub kris: Option<Vec<String>>,
    /// Control ids in place for this risk
    #[serde(default)]
    pub controls: Option<Vec<String>>,
    /// Definitions for KRIs that are not yet known
    #[serde(default)]
    pub kri_definitions: Option<BTreeMap<String, KriDefinition>>,
}

pub struct SetupMonitoring {
    service: Arc<MonitoringService>,
}

#[async_trait]
impl Tool for SetupMonitoring {
    const NAME: &'static str = "setup_monitoring";
    type Args = SetupMonitoringArgs;
    type Output = MonitoringSetupConfirmation;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Set up or extend monitoring for a risk with its key risk indicators and controls"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(self.service.setup(
            &args.risk_id,
            args.kris.as_deref().unwrap_or_default(),
            args.controls.as_deref().unwrap_or_default(),
            &args.kri_definitions.unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RunMonitoringCycleArgs {}

pub struct RunMonitoringCycle {
    service: Arc<MonitoringService>,
}

#[async_trait]
impl Tool for RunMonitoringCycle {
    const NAME: &'static str = "run_monitoring_cycle";
    type Args = RunMonitoringCycleArgs;
    type Output = MonitoringCycleResults;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Run one monitoring cycle: check KRI thresholds and control effectiveness for active risks"
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(self.service.run_cycle())
    }
}

fn default_report_type() -> String {
    "periodic".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateReportArgs {
    /// periodic (default), on_demand or dashboard_data
    #[serde(default = "default_report_type")]
    pub report_type: String,
}

pub struct GenerateReport {
    service: Arc<MonitoringService>,
}

#[async_trait]
impl Tool for GenerateReport {
    const NAME: &'static str = "generate_report";
    type Args = GenerateReportArgs;
    type Output = RiskReport;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Generate a risk monitoring report summarising monitored risks, KRIs, controls and recent alerts"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(self.service.report(&args.report_type))
    }
}

pub fn agent(model: Arc<dyn ChatModel>, service: Arc<MonitoringService>) -> AssistantAgent {
    AssistantAgent::new(MONITORING_REPORTING_AGENT, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Sets up KRI and control monitoring, runs monitoring cycles and reports status")
        .tool(SetupMonitoring {
            service: service.clone(),
        })
        .tool(RunMonitoringCycle {
            service: service.clone(),
        })
        .tool(GenerateReport { service })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::default_kri_definitions;
    use rand::SeedableRng;

    fn service() -> MonitoringService {
        MonitoringService::new(
            MONITORING_REPORTING_AGENT,
            default_kri_definitions(),
            StdRng::seed_from_u64(9),
        )
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn always_breached(operator: &str, threshold: f64) -> KriDefinition {
        KriDefinition {
            threshold,
            operator: operator.to_string(),
            data_source: None,
            frequency: None,
            min_val: 10.0,
            max_val: 20.0,
        }
    }

    #[test]
    fn test_setup_adds_without_duplicates() {
        let service = service();

        let first = service.setup(
            "RISK-001",
            &ids(&["KRI_CPU", "KRI_ERR"]),
            &ids(&["CTRL-OP-01"]),
            &BTreeMap::new(),
        );
        assert_eq!(first.kind, "MonitoringSetupConfirmation");
        assert_eq!(first.status, "Success");
        assert_eq!(
            first.message,
            "Monitoring setup for risk 'RISK-001'. Added KRIs: ['KRI_CPU', 'KRI_ERR'], Added Controls: ['CTRL-OP-01']."
        );

        let second = service.setup("RISK-001", &ids(&["KRI_CPU"]), &ids(&["CTRL-OP-01"]), &BTreeMap::new());
        assert!(second.message.ends_with("Added KRIs: [], Added Controls: []."));

        let state = service.snapshot();
        let risk = &state.monitored_risks["RISK-001"];
        assert_eq!(risk.kris, ids(&["KRI_CPU", "KRI_ERR"]));
        assert_eq!(risk.status, RiskStatus::Active);
        assert_eq!(
            state.control_effectiveness["CTRL-OP-01"],
            ControlState {
                status: ControlStatus::Unknown,
                last_checked: None
            }
        );
    }

    #[test]
    fn test_setup_stores_new_definitions() {
        let service = service();
        let definitions = BTreeMap::from([("KRI_LATENCY".to_string(), always_breached(">", 5.0))]);

        service.setup("RISK-002", &ids(&["KRI_LATENCY", "KRI_UNDEFINED"]), &[], &definitions);

        let state = service.snapshot();
        assert!(state.kri_definitions.contains_key("KRI_LATENCY"));
        assert!(!state.kri_definitions.contains_key("KRI_UNDEFINED"));
        assert_eq!(state.kri_definitions.len(), 5);
    }

    #[test]
    fn test_cycle_reports_breaches_and_skips_missing_definitions() {
        let service = service();
        let definitions = BTreeMap::from([
            ("KRI_HIGH".to_string(), always_breached(">", 5.0)),
            ("KRI_LOW".to_string(), always_breached("<", 25.0)),
            ("KRI_QUIET".to_string(), always_breached(">", 50.0)),
        ]);
        service.setup(
            "RISK-003",
            &ids(&["KRI_HIGH", "KRI_LOW", "KRI_QUIET", "KRI_MISSING"]),
            &[],
            &definitions,
        );

        let results = service.run_cycle();
        assert_eq!(results.kind, "MonitoringCycleResults");
        assert_eq!(results.kri_alerts.len(), 2);

        let alert = &results.kri_alerts[0];
        assert_eq!(alert.kri_id, "KRI_HIGH");
        assert_eq!(alert.risk_id, "RISK-003");
        assert!((10.0..=20.0).contains(&alert.current_value));
        assert!(alert
            .message
            .starts_with("KRI 'KRI_HIGH' breached threshold (> 5). Current value: "));
        assert!(alert.message.ends_with(" for Risk 'RISK-003'."));
        assert!(results.summary.starts_with("Monitoring cycle completed with 2 KRI alert(s)"));
    }

    #[test]
    fn test_controls_checked_once_per_cycle() {
        let service = service();
        service.setup("RISK-004", &[], &ids(&["CTRL-A", "CTRL-B"]), &BTreeMap::new());
        service.setup("RISK-005", &[], &ids(&["CTRL-A"]), &BTreeMap::new());

        let results = service.run_cycle();
        assert!(results.control_issues.len() <= 2);
        for issue in &results.control_issues {
            assert_eq!(issue.status, ControlStatus::Ineffective);
            assert_eq!(issue.risk_id, "RISK-004");
        }

        let state = service.snapshot();
        for control in ["CTRL-A", "CTRL-B"] {
            let checked = &state.control_effectiveness[control];
            assert_ne!(checked.status, ControlStatus::Unknown);
            assert_eq!(checked.last_checked, Some(results.timestamp));
        }
    }

    #[test]
    fn test_inactive_risks_are_not_monitored() {
        let service = service();
        let definitions = BTreeMap::from([("KRI_HIGH".to_string(), always_breached(">", 5.0))]);
        service.setup("RISK-006", &ids(&["KRI_HIGH"]), &ids(&["CTRL-C"]), &definitions);

        assert!(service.deactivate("RISK-006"));
        assert!(!service.deactivate("RISK-404"));

        let results = service.run_cycle();
        assert!(results.kri_alerts.is_empty());
        assert!(results.control_issues.is_empty());
        assert_eq!(
            service.snapshot().control_effectiveness["CTRL-C"].status,
            ControlStatus::Unknown
        );
    }

    #[test]
    fn test_recent_alerts_are_capped() {
        let service = service();
        let definitions = BTreeMap::from([("KRI_HIGH".to_string(), always_breached(">", 5.0))]);
        for n in 0..60 {
            service.setup(&format!("RISK-{:03}", n), &ids(&["KRI_HIGH"]), &[], &definitions);
        }

        let results = service.run_cycle();
        assert_eq!(results.kri_alerts.len(), 60);
        assert_eq!(service.snapshot().recent_alerts.len(), RECENT_ALERT_LIMIT);

        let report = service.report("periodic");
        assert_eq!(report.data.recent_alerts_issues.len(), REPORT_ALERT_LIMIT);
        match report.data.recent_alerts_issues.last() {
            Some(MonitoringEvent::Kri(alert)) => assert_eq!(alert.risk_id, "RISK-059"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_report_summary() {
        let service = service();
        service.setup("RISK-007", &ids(&["KRI_CPU"]), &ids(&["CTRL-OP-02"]), &BTreeMap::new());
        service.setup("RISK-008", &[], &ids(&["CTRL-FIN-02"]), &BTreeMap::new());
        service.deactivate("RISK-008");

        let report = service.report("on_demand");
        assert_eq!(report.kind, "On_demandRiskReport");
        assert_eq!(report.source, MONITORING_REPORTING_AGENT);
        assert_eq!(report.data.report_type, "on_demand");
        assert_eq!(report.data.monitored_risks_summary, RiskCounts { total: 2, active: 1 });
        assert_eq!(report.data.kri_summary.total_defined, 4);
        assert_eq!(
            report.data.control_effectiveness_summary,
            ControlSummary {
                total_tracked: 2,
                effective: 0,
                ineffective: 0,
                unknown: 2
            }
        );
    }

    #[tokio::test]
    async fn test_tools_share_the_registry() {
        let service = Arc::new(service());
        let setup = SetupMonitoring {
            service: service.clone(),
        };
        let report = GenerateReport {
            service: service.clone(),
        };

        let args: SetupMonitoringArgs =
            serde_json::from_str(r#"{"risk_id": "RISK-009", "kris": ["KRI_NPS"]}"#).unwrap();
        setup.call(args).await.unwrap();

        let args: GenerateReportArgs = serde_json::from_str("{}").unwrap();
        let report = report.call(args).await.unwrap();
        assert_eq!(report.kind, "PeriodicRiskReport");
        assert_eq!(report.data.monitored_risks_summary.total, 1);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("periodic"), "Periodic");
        assert_eq!(capitalize("DASHBOARD_DATA"), "Dashboard_data");
        assert_eq!(capitalize(""), "");
    }
}
