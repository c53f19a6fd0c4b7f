//! The risk assessment session: roster, coordination policy and kickoff message.

use group_chat::{
    Coordinator, GroupChatError, HumanInput, HumanInputMode, SessionOutcome, SpeakerSelection,
    TerminalInput, TranscriptObserver, UserProxyAgent, DEFAULT_MAX_ROUND,
};
use llm_client::ChatModel;
use std::sync::Arc;
use tracing::info;

use crate::agents::{self, MonitoringService};
use crate::policy::RiskPolicy;

pub const COORDINATOR_NAME: &str = "Risk_Assessment_Manager";
pub const HUMAN_PROXY_NAME: &str = "Risk_Manager";

pub const HUMAN_SYSTEM_MESSAGE: &str = "You are the Risk Manager. You start risk management tasks such as \
the annual risk assessment, review the final report and strategy suggestions the team produces, and ask \
clarifying questions when needed. Type TERMINATE to end the process.";

/// Instructions for the coordinator's own turns.
pub const COORDINATION_POLICY: &str = r#"You manage a risk assessment team and orchestrate its members through the workflow below.

Workflow:
1. Initiation: Risk_Manager starts the process, for example "Start the annual risk assessment".
2. Data collection: have Internal_Data_Scanner, External_Environment_Monitor and Market_Industry_Analyst run `scan_internal_data`, `monitor_external_environment` and `analyze_market_industry`. Wait for their function results.
3. Identification and assessment: summarise the key findings and name the potential risks. Give each one a temporary id (RISK-001, RISK-002, ...) and decide whether it needs quantitative assessment, qualitative assessment, or both. Call `perform_quantitative_assessment` (Quantitative_Risk_Assessor) and `perform_qualitative_assessment` (Qualitative_Risk_Assessor) with the input data taken from the collection phase.
4. Integration and prioritisation: combine the assessment results into a prioritized risk list ordered by level (Critical, High, Medium, Low) and present it clearly.
5. Response strategies: call `develop_response_strategies` (Response_Strategy_Agent) with the prioritized risks, including each risk's id, category and assessment.
6. Reporting: present the prioritized risk list and the response strategies to Risk_Manager for review.
7. Monitoring: assume approval, then call `setup_monitoring` (Monitoring_Reporting_Agent) for the High and Critical risks with their controls from the response strategies, passing KRI definitions where you have them.
8. Conclusion: tell Risk_Manager the workflow is complete and monitoring is in place.

General instructions:
- Call agent functions through tool calls, with arguments that match each function's parameters.
- Wait for a function result before moving to the next step. Results arrive as messages from the agent that owns the function.
- Carry data forward: collection findings feed the assessments, assessments feed the strategies.
- Address agents by name and keep instructions short and clear.
- If an agent reports an error, acknowledge it and decide whether the workflow can continue.
- Finish with a summary of the outcome for Risk_Manager and end that final message with TERMINATE."#;

/// Message the human proxy opens the session with.
pub const INITIAL_MESSAGE: &str = "Start the annual risk assessment process. Please follow the standard workflow:
1. Collect data (Internal, External, Market).
2. Assess identified risks (Quantitative & Qualitative).
3. Integrate and prioritize risks.
4. Develop response strategies for high/critical risks.
5. Report findings and strategies.
6. Set up monitoring for key risks/controls.";

// =============================================================================
// Builder
// =============================================================================

pub struct RiskWorkflowBuilder {
    model: Arc<dyn ChatModel>,
    selector_model: Option<Arc<dyn ChatModel>>,
    input: Option<Arc<dyn HumanInput>>,
    policy: RiskPolicy,
    speaker_selection: SpeakerSelection,
    human_input_mode: HumanInputMode,
    max_round: usize,
    seed: Option<u64>,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl RiskWorkflowBuilder {
    /// Separate model for choosing speakers in `auto` mode.
    pub fn selector_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.selector_model = Some(model);
        self
    }

    /// Where the human proxy reads answers from. Defaults to the terminal.
    pub fn human_input(mut self, input: Arc<dyn HumanInput>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.speaker_selection = selection;
        self
    }

    pub fn human_input_mode(mut self, mode: HumanInputMode) -> Self {
        self.human_input_mode = mode;
        self
    }

    pub fn max_round(mut self, max_round: usize) -> Self {
        self.max_round = max_round;
        self
    }

    /// Seed for the synthetic specialist data.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn observer(mut self, observer: Box<dyn TranscriptObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<RiskWorkflow, GroupChatError> {
        let input = self.input.unwrap_or_else(|| Arc::new(TerminalInput));
        let human = UserProxyAgent::new(HUMAN_PROXY_NAME, input)
            .system_message(HUMAN_SYSTEM_MESSAGE)
            .human_input_mode(self.human_input_mode)
            .max_consecutive_auto_reply(10);

        let specialists = agents::specialists(self.model.clone(), &self.policy, self.seed);

        let mut builder = Coordinator::builder(COORDINATOR_NAME)
            .policy(COORDINATION_POLICY)
            .description("Manages the risk assessment team and decides the next step of the workflow")
            .model(self.model)
            .speaker_selection(self.speaker_selection)
            .max_round(self.max_round)
            .agent(Arc::new(human))
            .agents(specialists.agents);

        if let Some(selector) = self.selector_model {
            builder = builder.selector_model(selector);
        }
        for observer in self.observers {
            builder = builder.observer(observer);
        }

        Ok(RiskWorkflow {
            coordinator: builder.build()?,
            monitoring: specialists.monitoring,
        })
    }
}

// =============================================================================
// Workflow
// =============================================================================

pub struct RiskWorkflow {
    coordinator: Coordinator,
    monitoring: Arc<MonitoringService>,
}

impl RiskWorkflow {
    pub fn builder(model: Arc<dyn ChatModel>) -> RiskWorkflowBuilder {
        RiskWorkflowBuilder {
            model,
            selector_model: None,
            input: None,
            policy: RiskPolicy::default(),
            speaker_selection: SpeakerSelection::Auto,
            human_input_mode: HumanInputMode::Terminate,
            max_round: DEFAULT_MAX_ROUND,
            seed: None,
            observers: Vec::new(),
        }
    }

    pub fn participant_names(&self) -> Vec<&str> {
        self.coordinator.participant_names()
    }

    /// The monitoring registry, which outlives the session.
    pub fn monitoring(&self) -> &Arc<MonitoringService> {
        &self.monitoring
    }

    /// Run one session with the standard kickoff message.
    pub async fn run(&self) -> Result<SessionOutcome, GroupChatError> {
        self.run_task(INITIAL_MESSAGE).await
    }

    /// Run one session where the risk manager opens with `task`.
    pub async fn run_task(&self, task: &str) -> Result<SessionOutcome, GroupChatError> {
        info!(participants = self.participant_names().len(), "Starting risk assessment session");
        self.coordinator.run(HUMAN_PROXY_NAME, task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::SPECIALIST_NAMES;
    use group_chat::ScriptedInput;
    use llm_client::testing::ScriptedChatModel;

    #[test]
    fn test_roster_order() {
        let workflow = RiskWorkflow::builder(Arc::new(ScriptedChatModel::new()))
            .human_input(Arc::new(ScriptedInput::default()))
            .build()
            .unwrap();

        let names = workflow.participant_names();
        assert_eq!(names[0], HUMAN_PROXY_NAME);
        assert_eq!(names[1], COORDINATOR_NAME);
        assert_eq!(&names[2..], SPECIALIST_NAMES);
    }

    #[test]
    fn test_policy_names_every_function_and_agent() {
        for name in SPECIALIST_NAMES {
            assert!(COORDINATION_POLICY.contains(name), "policy does not mention {}", name);
        }
        for function in [
            "scan_internal_data",
            "monitor_external_environment",
            "analyze_market_industry",
            "perform_quantitative_assessment",
            "perform_qualitative_assessment",
            "develop_response_strategies",
            "setup_monitoring",
        ] {
            assert!(COORDINATION_POLICY.contains(function));
        }
        assert!(COORDINATION_POLICY.contains("prioritized risk list"));
        assert!(COORDINATION_POLICY.trim_end().ends_with("TERMINATE."));
    }
}
