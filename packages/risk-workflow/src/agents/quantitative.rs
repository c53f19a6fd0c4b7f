//! Quantitative risk assessor: parametric VaR, stress tests and Monte Carlo.
//!
//! The models are placeholders. VaR uses the closed-form parametric formula,
//! the stress test scales the portfolio by a shock, and the Monte Carlo summary
//! is drawn at random around the portfolio value.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use rand::rngs::StdRng;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::{format_number, lock, round2, QUANTITATIVE_RISK_ASSESSOR};

const SYSTEM_MESSAGE: &str = r#"You are the Quantitative Risk Assessor.
When asked, you quantify risks with mathematical and statistical models: Value at Risk ("VaR"), stress tests ("StressTest") and Monte Carlo simulation ("MonteCarlo").
Each request gives a risk description, the data describing it, the assessment type and optional parameters, for example:
{
  "risk_description": "Potential loss on equity portfolio due to market downturn",
  "data": {"portfolio_value": 1000000, "volatility": 0.2},
  "assessment_type": "VaR",
  "parameters": {"confidence_level": 0.99, "time_horizon_days": 1}
}
Report the results in a structured form and state the assumptions behind them.
You only respond to requests and never start a conversation yourself."#;

/// Trading days per year used to scale volatility.
const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QuantitativeArgs {
    /// Description of the risk being assessed
    pub risk_description: String,
    /// Inputs such as portfolio_value and volatility
    #[serde(default)]
    pub data: Map<String, Value>,
    /// One of VaR, StressTest, MonteCarlo (case-insensitive)
    pub assessment_type: String,
    /// Model parameters such as confidence_level, time_horizon_days, scenario_name,
    /// scenario_details or num_simulations
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSummary {
    pub data_keys: Vec<String>,
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeAssessment {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub assessment_type_performed: String,
    pub results: Value,
    pub input_risk_description: String,
    pub input_summary: InputSummary,
}

pub struct PerformQuantitativeAssessment {
    source: String,
    rng: Mutex<StdRng>,
}

impl PerformQuantitativeAssessment {
    pub fn new(source: impl Into<String>, rng: StdRng) -> Self {
        Self {
            source: source.into(),
            rng: Mutex::new(rng),
        }
    }

    fn monte_carlo(&self, data: &Map<String, Value>, params: &Map<String, Value>) -> Result<Value, String> {
        let value = number(data, "portfolio_value", 0.0)?;
        let num_simulations = params
            .get("num_simulations")
            .cloned()
            .unwrap_or_else(|| json!(10_000));

        let (drift, spread) = {
            let mut rng = lock(&self.rng);
            (rng.gen_range(-0.05..=0.05), rng.gen_range(0.01..=0.1))
        };

        Ok(json!({
            "method": "Monte Carlo Simulation",
            "num_simulations": num_simulations,
            "result_summary": {
                "mean_outcome": round2(value * (1.0 + drift)),
                "std_dev": round2(value * spread),
            }
        }))
    }
}

#[async_trait]
impl Tool for PerformQuantitativeAssessment {
    const NAME: &'static str = "perform_quantitative_assessment";
    type Args = QuantitativeArgs;
    type Output = QuantitativeAssessment;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Perform a quantitative risk assessment (VaR, StressTest or MonteCarlo) on the supplied data"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(
            agent = %self.source,
            assessment_type = %args.assessment_type,
            risk = %args.risk_description,
            "Quantitative assessment requested"
        );

        let params = args.parameters.unwrap_or_default();
        let outcome = match args.assessment_type.to_uppercase().as_str() {
            "VAR" => Some(parametric_var(&args.data, &params)),
            "STRESSTEST" => Some(stress_test(&args.data, &params)),
            "MONTECARLO" => Some(self.monte_carlo(&args.data, &params)),
            _ => None,
        };

        let (performed, results) = match outcome {
            Some(Ok(results)) => (args.assessment_type.clone(), results),
            Some(Err(e)) => {
                warn!(agent = %self.source, assessment_type = %args.assessment_type, error = %e, "Assessment failed");
                (
                    format!("{}_Failed", args.assessment_type),
                    json!({
                        "error": format!("An error occurred during {} assessment: {}", args.assessment_type, e)
                    }),
                )
            }
            None => {
                warn!(agent = %self.source, assessment_type = %args.assessment_type, "Unsupported assessment type");
                (
                    "Unsupported".to_string(),
                    json!({ "error": format!("Unsupported assessment type: {}", args.assessment_type) }),
                )
            }
        };

        Ok(QuantitativeAssessment {
            source: self.source.clone(),
            kind: "QuantitativeAssessment".to_string(),
            assessment_type_performed: performed,
            results,
            input_risk_description: args.risk_description,
            input_summary: InputSummary {
                data_keys: args.data.keys().cloned().collect(),
                params,
            },
        })
    }
}

pub fn agent(model: Arc<dyn ChatModel>, rng: StdRng) -> AssistantAgent {
    AssistantAgent::new(QUANTITATIVE_RISK_ASSESSOR, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Quantifies risks with VaR, stress tests and Monte Carlo simulation")
        .tool(PerformQuantitativeAssessment::new(QUANTITATIVE_RISK_ASSESSOR, rng))
}

// =============================================================================
// Models
// =============================================================================

/// Parametric VaR: `value * volatility * z(confidence) * sqrt(horizon / 252)`.
///
/// Missing or non-positive value or volatility is reported in the results rather
/// than as a failure.
pub fn parametric_var(data: &Map<String, Value>, params: &Map<String, Value>) -> Result<Value, String> {
    let value = number(data, "portfolio_value", 0.0)?;
    let volatility = number(data, "volatility", 0.0)?;
    let confidence = number(params, "confidence_level", 0.95)?;
    let horizon = number(params, "time_horizon_days", 1.0)?;

    if !(value > 0.0 && volatility > 0.0) {
        warn!("Insufficient data for parametric VaR");
        return Ok(json!({ "error": "Insufficient data for Parametric VaR" }));
    }
    if !(confidence > 0.5 && confidence < 1.0) {
        return Err(format!("confidence_level must be above 0.5 and below 1, got {}", confidence));
    }
    if !(horizon > 0.0 && horizon.is_finite()) {
        return Err(format!("time_horizon_days must be positive, got {}", horizon));
    }

    let z = norm_inv(confidence);
    let var = value * volatility * z * (horizon / TRADING_DAYS).sqrt();
    let horizon_label = format_number(horizon);

    let mut results = Map::new();
    results.insert(
        format!("VaR_{}_{}day", (confidence * 100.0) as i64, horizon_label),
        json!(round2(var)),
    );
    results.insert("method".into(), json!("Parametric VaR"));
    results.insert(
        "assumptions".into(),
        json!([
            "Normal distribution of returns",
            format!("{} day horizon", horizon_label),
            format!("{:?}% confidence", confidence * 100.0),
        ]),
    );
    Ok(Value::Object(results))
}

/// Apply a market shock to the portfolio value.
pub fn stress_test(data: &Map<String, Value>, params: &Map<String, Value>) -> Result<Value, String> {
    let value = number(data, "portfolio_value", 0.0)?;
    let scenario = params
        .get("scenario_name")
        .and_then(Value::as_str)
        .unwrap_or("Generic Stress");
    let details = match params.get("scenario_details") {
        Some(Value::Object(details)) => details.clone(),
        Some(other) => return Err(format!("scenario_details must be an object, got {}", other)),
        None => Map::from_iter([("market_shock".to_string(), json!(-0.1))]),
    };
    let shock = number(&details, "market_shock", 0.0)?;

    Ok(json!({
        "scenario": scenario,
        "estimated_impact": round2(value * shock),
        "details": details,
    }))
}

/// Read a numeric field. Absent or null fields take the default.
fn number(map: &Map<String, Value>, key: &str, default: f64) -> Result<f64, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("{} is out of range", key)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a number, got {:?}", key, s)),
        Some(other) => Err(format!("{} must be a number, got {}", key, other)),
    }
}

/// Inverse standard normal CDF (Acklam's rational approximation).
pub fn norm_inv(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let a = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    let b = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    let c = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    let d = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    let p_low = 0.02425;
    let p_high = 1.0 - p_low;

    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= p_high {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn tool() -> PerformQuantitativeAssessment {
        PerformQuantitativeAssessment::new(QUANTITATIVE_RISK_ASSESSOR, StdRng::seed_from_u64(11))
    }

    fn args(kind: &str, data: Value, parameters: Option<Value>) -> QuantitativeArgs {
        serde_json::from_value(json!({
            "risk_description": "Equity portfolio drawdown",
            "data": data,
            "assessment_type": kind,
            "parameters": parameters,
        }))
        .unwrap()
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_norm_inv_known_quantiles() {
        assert!(norm_inv(0.5).abs() < 1e-9);
        assert!((norm_inv(0.95) - 1.644854).abs() < 1e-5);
        assert!((norm_inv(0.99) - 2.326348).abs() < 1e-5);
        assert!((norm_inv(0.01) + 2.326348).abs() < 1e-5);
        assert_eq!(norm_inv(1.0), f64::INFINITY);
        assert_eq!(norm_inv(0.0), f64::NEG_INFINITY);
    }

    #[tokio::test]
    async fn test_var_report() {
        let report = tool()
            .call(args(
                "var",
                json!({"portfolio_value": 1_000_000, "volatility": 0.2}),
                Some(json!({"confidence_level": 0.99, "time_horizon_days": 1})),
            ))
            .await
            .unwrap();

        assert_eq!(report.kind, "QuantitativeAssessment");
        assert_eq!(report.assessment_type_performed, "var");
        assert_eq!(report.input_risk_description, "Equity portfolio drawdown");
        assert_eq!(report.input_summary.data_keys, vec!["portfolio_value", "volatility"]);

        let var = report.results["VaR_99_1day"].as_f64().unwrap();
        assert!((var - 29_309.23).abs() < 0.05, "got {}", var);
        assert_eq!(report.results["method"], "Parametric VaR");
        assert_eq!(report.results["assumptions"][1], "1 day horizon");
        assert_eq!(report.results["assumptions"][2], "99.0% confidence");
    }

    #[test]
    fn test_var_defaults_and_missing_inputs() {
        let results = parametric_var(
            &as_map(json!({"portfolio_value": 500_000, "volatility": 0.1})),
            &Map::new(),
        )
        .unwrap();
        assert!(results.get("VaR_95_1day").is_some());

        let results = parametric_var(&as_map(json!({"portfolio_value": 500_000})), &Map::new()).unwrap();
        assert_eq!(results["error"], "Insufficient data for Parametric VaR");
    }

    #[tokio::test]
    async fn test_invalid_inputs_mark_assessment_failed() {
        let report = tool()
            .call(args(
                "VaR",
                json!({"portfolio_value": "a lot", "volatility": 0.2}),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(report.assessment_type_performed, "VaR_Failed");
        assert!(report.results["error"]
            .as_str()
            .unwrap()
            .starts_with("An error occurred during VaR assessment"));
    }

    #[test]
    fn test_stress_test_default_shock() {
        let results = stress_test(&as_map(json!({"portfolio_value": 2_000_000})), &Map::new()).unwrap();

        assert_eq!(results["scenario"], "Generic Stress");
        assert_eq!(results["estimated_impact"], json!(-200_000.0));
        assert_eq!(results["details"]["market_shock"], json!(-0.1));

        let results = stress_test(
            &as_map(json!({"portfolio_value": 1000})),
            &as_map(json!({"scenario_name": "Rate spike", "scenario_details": {"market_shock": -0.35}})),
        )
        .unwrap();
        assert_eq!(results["scenario"], "Rate spike");
        assert_eq!(results["estimated_impact"], json!(-350.0));
    }

    #[tokio::test]
    async fn test_monte_carlo_summary_bounds() {
        let report = tool()
            .call(args("MonteCarlo", json!({"portfolio_value": 1000}), None))
            .await
            .unwrap();

        let summary = &report.results["result_summary"];
        let mean = summary["mean_outcome"].as_f64().unwrap();
        let std_dev = summary["std_dev"].as_f64().unwrap();
        assert!((950.0..=1050.0).contains(&mean));
        assert!((10.0..=100.0).contains(&std_dev));
        assert_eq!(report.results["num_simulations"], json!(10_000));
    }

    #[tokio::test]
    async fn test_unsupported_type() {
        let report = tool().call(args("Scenario", json!({}), None)).await.unwrap();

        assert_eq!(report.assessment_type_performed, "Unsupported");
        assert_eq!(report.results["error"], "Unsupported assessment type: Scenario");
    }

    proptest! {
        #[test]
        fn var_is_positive_finite_and_bounded(
            value in 1.0e4f64..1.0e9,
            volatility in 0.01f64..2.0,
            confidence in 0.6f64..0.999,
            horizon in 1u32..365,
        ) {
            let results = parametric_var(
                &as_map(json!({"portfolio_value": value, "volatility": volatility})),
                &as_map(json!({"confidence_level": confidence, "time_horizon_days": horizon})),
            ).unwrap();

            let key = format!("VaR_{}_{}day", (confidence * 100.0) as i64, horizon);
            let var = results[&key].as_f64().unwrap();
            let bound = value * volatility * norm_inv(confidence) * (horizon as f64 / TRADING_DAYS).sqrt();

            prop_assert!(var.is_finite());
            prop_assert!(var > 0.0);
            prop_assert!(var <= round2(bound) + 1e-6);
        }
    }
}
