//! Market and industry analyst.

use async_trait::async_trait;
use group_chat::AssistantAgent;
use llm_client::{ChatModel, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

use super::{SignalReport, MARKET_INDUSTRY_ANALYST};

const SYSTEM_MESSAGE: &str = r#"You are the Market & Industry Analyst.
When asked, you analyse competitor activity, supply chain exposure, customer behaviour and technology shifts in the company's market.
Report the specific risks you find, grouped by area.
You only respond to requests and never start a conversation yourself.
Output format:
{
  "source": "Market_Industry_Analyst",
  "type": "MarketIndustryRisks",
  "data": {
    "competitor": ["..."],
    "supply_chain": ["..."],
    "customer": ["..."],
    "technology": ["..."]
  }
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRisks {
    pub competitor: Vec<String>,
    pub supply_chain: Vec<String>,
    pub customer: Vec<String>,
    pub technology: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AnalyzeMarketArgs {}

pub struct AnalyzeMarketIndustry {
    source: String,
}

impl AnalyzeMarketIndustry {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

#[async_trait]
impl Tool for AnalyzeMarketIndustry {
    const NAME: &'static str = "analyze_market_industry";
    type Args = AnalyzeMarketArgs;
    type Output = SignalReport<MarketRisks>;
    type Error = Infallible;

    fn description(&self) -> &str {
        "Analyze competitor, supply chain, customer and technology risks in the market"
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        info!(agent = %self.source, "Analyzing market and industry");

        let data = MarketRisks {
            competitor: vec![
                "Example competitor risk: Major competitor launched a disruptive product in adjacent market."
                    .into(),
            ],
            supply_chain: vec![
                "Example supply chain risk: Key supplier for component X located in politically unstable region."
                    .into(),
            ],
            customer: vec![
                "Example customer trend: Declining Net Promoter Score (NPS) in key customer segment."
                    .into(),
            ],
            technology: vec![
                "Example technology risk: Emergence of a new manufacturing process threatening cost structure."
                    .into(),
            ],
        };

        Ok(SignalReport::new(&self.source, "MarketIndustryRisks", data))
    }
}

pub fn agent(model: Arc<dyn ChatModel>) -> AssistantAgent {
    AssistantAgent::new(MARKET_INDUSTRY_ANALYST, model)
        .system_message(SYSTEM_MESSAGE)
        .with_description("Analyzes competitor, supply chain, customer and technology risks")
        .tool(AnalyzeMarketIndustry::new(MARKET_INDUSTRY_ANALYST))
}
