//! Company risk policy: appetite, assessment matrix, control library and KRIs.
//!
//! Every part has a built-in default. A JSON policy file may replace any of the
//! four sections; sections it leaves out keep their defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for the fallback entry of a category, and for the fallback category.
pub const DEFAULT_KEY: &str = "Default";

// =============================================================================
// Risk levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Risk appetite
// =============================================================================

/// Guidance per level within one category, e.g. `High -> "Mitigate/Transfer"`.
pub type CategoryAppetite = BTreeMap<String, String>;

/// Category -> (risk level | `Default`) -> guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RiskAppetite(pub BTreeMap<String, CategoryAppetite>);

impl RiskAppetite {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The table for a category. Unknown categories have none.
    pub fn category(&self, category: &str) -> Option<&CategoryAppetite> {
        self.0.get(category)
    }

    /// Guidance for a level: the category's entry, then its `Default`, then "Accept".
    /// A category missing from the table always gets "Accept".
    pub fn guidance(&self, category: &str, level: &str) -> &str {
        self.category(category)
            .and_then(|table| table.get(level).or_else(|| table.get(DEFAULT_KEY)))
            .map(String::as_str)
            .unwrap_or("Accept")
    }

    /// Whether the category's table names this level explicitly.
    pub fn has_explicit(&self, category: &str, level: &str) -> bool {
        self.category(category).is_some_and(|table| table.contains_key(level))
    }
}

impl Default for RiskAppetite {
    fn default() -> Self {
        fn table(entries: &[(&str, &str)]) -> CategoryAppetite {
            entries
                .iter()
                .map(|(level, guidance)| (level.to_string(), guidance.to_string()))
                .collect()
        }

        let mut appetite = BTreeMap::new();
        appetite.insert(
            "Operational".to_string(),
            table(&[
                ("Low", "Accept"),
                ("Medium", "Mitigate"),
                ("High", "Mitigate/Transfer"),
                ("Critical", "Avoid/Transfer"),
                (DEFAULT_KEY, "Accept"),
            ]),
        );
        appetite.insert(
            "Financial".to_string(),
            table(&[
                ("Low", "Accept"),
                ("Medium", "Mitigate"),
                ("High", "Transfer/Mitigate"),
                ("Critical", "Transfer/Avoid"),
                (DEFAULT_KEY, "Accept"),
            ]),
        );
        appetite.insert(
            "Reputational".to_string(),
            table(&[
                ("Low", "Accept"),
                ("Medium", "Mitigate"),
                ("High", "Mitigate"),
                ("Critical", "Mitigate/Avoid"),
                (DEFAULT_KEY, "Accept"),
            ]),
        );
        appetite.insert(
            "Compliance".to_string(),
            table(&[
                ("Low", "Mitigate"),
                ("Medium", "Mitigate"),
                ("High", "Mitigate"),
                ("Critical", "Mitigate"),
                (DEFAULT_KEY, "Mitigate"),
            ]),
        );
        appetite.insert(
            DEFAULT_KEY.to_string(),
            table(&[
                ("Low", "Accept"),
                ("Medium", "Accept"),
                ("High", "Mitigate"),
                ("Critical", "Avoid/Transfer"),
                (DEFAULT_KEY, "Accept"),
            ]),
        );
        Self(appetite)
    }
}

// =============================================================================
// Risk matrix
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskMatrix {
    pub likelihood_scale: Vec<String>,
    pub impact_scale: Vec<String>,
    /// Indexed `[likelihood][impact]`
    pub level_map: Vec<Vec<RiskLevel>>,
}

impl RiskMatrix {
    pub fn level(&self, likelihood: usize, impact: usize) -> Option<RiskLevel> {
        self.level_map.get(likelihood)?.get(impact).copied()
    }

    /// Look a level up by scale labels.
    pub fn level_for(&self, likelihood: &str, impact: &str) -> Option<RiskLevel> {
        let l = self.likelihood_scale.iter().position(|s| s == likelihood)?;
        let i = self.impact_scale.iter().position(|s| s == impact)?;
        self.level(l, i)
    }
}

impl Default for RiskMatrix {
    fn default() -> Self {
        use RiskLevel::*;

        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            likelihood_scale: labels(&["Very Low", "Low", "Medium", "High", "Very High"]),
            impact_scale: labels(&["Insignificant", "Minor", "Moderate", "Major", "Catastrophic"]),
            level_map: vec![
                vec![Low, Low, Low, Medium, Medium],
                vec![Low, Low, Medium, Medium, High],
                vec![Low, Medium, Medium, High, High],
                vec![Medium, Medium, High, High, Critical],
                vec![Medium, High, High, Critical, Critical],
            ],
        }
    }
}

// =============================================================================
// Control library
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Control {
    pub id: String,
    pub name: String,
    pub cost: String,
    pub effectiveness: String,
}

impl Control {
    fn new(id: &str, name: &str, cost: &str, effectiveness: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cost: cost.to_string(),
            effectiveness: effectiveness.to_string(),
        }
    }
}

/// Category -> available controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ControlLibrary(pub BTreeMap<String, Vec<Control>>);

impl ControlLibrary {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn controls(&self, category: &str) -> &[Control] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for ControlLibrary {
    fn default() -> Self {
        let mut library = BTreeMap::new();
        library.insert(
            "Operational".to_string(),
            vec![
                Control::new("CTRL-OP-01", "Implement Redundant Server", "High", "High"),
                Control::new("CTRL-OP-02", "Regular Data Backups", "Medium", "High"),
                Control::new("CTRL-OP-03", "Hardware Maintenance Schedule", "Medium", "Medium"),
            ],
        );
        library.insert(
            "Financial".to_string(),
            vec![
                Control::new(
                    "CTRL-FIN-01",
                    "Hedging Instruments (e.g., Futures, Options)",
                    "Variable",
                    "Medium-High",
                ),
                Control::new("CTRL-FIN-02", "Diversification of Investments", "Low", "Medium"),
            ],
        );
        library.insert(
            "Compliance".to_string(),
            vec![
                Control::new("CTRL-CMP-01", "Mandatory Compliance Training", "Medium", "Medium"),
                Control::new("CTRL-CMP-02", "Automated Compliance Checks", "High", "High"),
            ],
        );
        Self(library)
    }
}

// =============================================================================
// Key risk indicators
// =============================================================================

fn default_threshold() -> f64 {
    100.0
}

fn default_operator() -> String {
    ">".to_string()
}

fn default_max_val() -> f64 {
    200.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KriDefinition {
    /// Value the indicator is compared against
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// One of `>`, `<`, `==`
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    /// Lower bound of the simulated reading
    #[serde(default)]
    pub min_val: f64,
    /// Upper bound of the simulated reading
    #[serde(default = "default_max_val")]
    pub max_val: f64,
}

impl KriDefinition {
    /// Whether a reading breaches the threshold. Unknown operators never breach.
    pub fn is_breached(&self, value: f64) -> bool {
        match self.operator.trim() {
            ">" => value > self.threshold,
            "<" => value < self.threshold,
            "==" => value == self.threshold,
            _ => false,
        }
    }
}

fn kri(threshold: f64, operator: &str, data_source: &str, frequency: &str, range: (f64, f64)) -> KriDefinition {
    KriDefinition {
        threshold,
        operator: operator.to_string(),
        data_source: Some(data_source.to_string()),
        frequency: Some(frequency.to_string()),
        min_val: range.0,
        max_val: range.1,
    }
}

pub fn default_kri_definitions() -> BTreeMap<String, KriDefinition> {
    BTreeMap::from([
        (
            "KRI_CPU".to_string(),
            kri(90.0, ">", "internal_monitoring_system", "hourly", (0.0, 100.0)),
        ),
        (
            "KRI_ERR".to_string(),
            kri(5.0, ">", "log_aggregator", "daily", (0.0, 100.0)),
        ),
        (
            "KRI_VAR".to_string(),
            kri(100_000.0, ">", "quant_assessment_output", "daily", (0.0, 500_000.0)),
        ),
        (
            "KRI_NPS".to_string(),
            kri(30.0, "<", "customer_survey_platform", "monthly", (-100.0, 100.0)),
        ),
    ])
}

// =============================================================================
// Policy bundle
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub risk_appetite: RiskAppetite,
    pub risk_matrix: RiskMatrix,
    pub control_library: ControlLibrary,
    pub kri_definitions: BTreeMap<String, KriDefinition>,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            risk_appetite: RiskAppetite::default(),
            risk_matrix: RiskMatrix::default(),
            control_library: ControlLibrary::default(),
            kri_definitions: default_kri_definitions(),
        }
    }
}

impl RiskPolicy {
    /// Parse a policy document; missing sections keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_lookup_order() {
        let appetite = RiskAppetite::default();

        assert_eq!(appetite.guidance("Operational", "High"), "Mitigate/Transfer");
        assert_eq!(appetite.guidance("Operational", "Unrated"), "Accept");
        assert_eq!(appetite.guidance("Compliance", "Low"), "Mitigate");
        // Unknown categories never borrow another category's table
        assert_eq!(appetite.guidance("Strategic", "Critical"), "Accept");
        assert_eq!(appetite.guidance("General", "High"), "Accept");
        assert!(!appetite.has_explicit("General", "High"));
        assert_eq!(appetite.guidance(DEFAULT_KEY, "Critical"), "Avoid/Transfer");

        let empty = RiskAppetite(BTreeMap::new());
        assert_eq!(empty.guidance("Operational", "High"), "Accept");
    }

    #[test]
    fn test_matrix_levels() {
        let matrix = RiskMatrix::default();

        assert_eq!(matrix.level_for("Very Low", "Insignificant"), Some(RiskLevel::Low));
        assert_eq!(matrix.level_for("High", "Catastrophic"), Some(RiskLevel::Critical));
        assert_eq!(matrix.level_for("Medium", "Major"), Some(RiskLevel::High));
        assert_eq!(matrix.level_for("Certain", "Major"), None);
        assert_eq!(matrix.level(5, 0), None);
    }

    #[test]
    fn test_kri_operators() {
        let defs = default_kri_definitions();

        assert!(defs["KRI_CPU"].is_breached(95.0));
        assert!(!defs["KRI_CPU"].is_breached(90.0));
        assert!(defs["KRI_NPS"].is_breached(12.0));

        let odd = KriDefinition {
            operator: ">=".into(),
            ..defs["KRI_CPU"].clone()
        };
        assert!(!odd.is_breached(1000.0));
    }

    #[test]
    fn test_partial_policy_file_keeps_defaults() {
        let policy = RiskPolicy::from_json(
            r#"{"kri_definitions": {"KRI_LATENCY": {"threshold": 250}}}"#,
        )
        .unwrap();

        assert_eq!(policy.risk_matrix, RiskMatrix::default());
        assert_eq!(policy.control_library, ControlLibrary::default());

        let latency = &policy.kri_definitions["KRI_LATENCY"];
        assert_eq!(latency.threshold, 250.0);
        assert_eq!(latency.operator, ">");
        assert_eq!((latency.min_val, latency.max_val), (0.0, 200.0));
        assert!(!policy.kri_definitions.contains_key("KRI_CPU"));
    }
}
