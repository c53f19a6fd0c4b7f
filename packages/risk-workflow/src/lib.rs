//! Risk assessment group chat
//!
//! A coordinator (`Risk_Assessment_Manager`), a human risk manager and seven
//! specialist agents work through an annual risk assessment: data collection,
//! quantitative and qualitative assessment, prioritisation, response strategies
//! and monitoring setup.
//!
//! # Example
//!
//! ```rust,ignore
//! use risk_workflow::{AppConfig, RiskWorkflow};
//!
//! let config = AppConfig::from_env()?;
//! let workflow = RiskWorkflow::builder(Arc::new(LlmRouter::new(config.llm)))
//!     .policy(config.policy)
//!     .observer(Box::new(ConsoleTranscript))
//!     .build()?;
//!
//! let outcome = workflow.run().await?;
//! ```

pub mod agents;
pub mod config;
pub mod policy;
pub mod report;
pub mod workflow;

pub use agents::{MonitoringService, SPECIALIST_NAMES};
pub use config::{load_policy, AppConfig, SessionSettings};
pub use policy::{ControlLibrary, KriDefinition, RiskAppetite, RiskLevel, RiskMatrix, RiskPolicy};
pub use report::{extract_final_report, FinalReport};
pub use workflow::{
    RiskWorkflow, RiskWorkflowBuilder, COORDINATION_POLICY, COORDINATOR_NAME, HUMAN_PROXY_NAME,
    INITIAL_MESSAGE,
};
