//! The group chat manager.
//!
//! Owns the roster and the append-only transcript, hands out turns one at a time,
//! and stops when a human proxy sends the termination token or the round limit is
//! reached. The coordinator is a participant too: its voice is an
//! [`AssistantAgent`] driven by the coordination policy that can call every
//! function registered in the roster.

use llm_client::{ChatModel, ToolCall};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{AssistantAgent, ConversableAgent};
use crate::error::{GroupChatError, Result};
use crate::message::{ChatMessage, ToolResult, TERMINATION_TOKEN};
use crate::selection::{NextTurn, SpeakerSelection, SpeakerSelector};
use crate::transcript::TranscriptObserver;

/// Default message limit per session, the initial message included.
pub const DEFAULT_MAX_ROUND: usize = 50;

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A human proxy sent the termination token
    Terminated { by: String },
    /// The transcript reached the round limit first
    MaxRounds,
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub transcript: Vec<ChatMessage>,
    pub reason: StopReason,
}

impl SessionOutcome {
    pub fn is_terminated(&self) -> bool {
        matches!(self.reason, StopReason::Terminated { .. })
    }

    /// Messages sent by `name`.
    pub fn messages_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ChatMessage> + 'a {
        self.transcript.iter().filter(move |m| m.sender == name)
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct CoordinatorBuilder {
    name: String,
    policy: String,
    description: String,
    agents: Vec<Arc<dyn ConversableAgent>>,
    model: Option<Arc<dyn ChatModel>>,
    selector_model: Option<Arc<dyn ChatModel>>,
    selection: SpeakerSelection,
    allow_repeat_speaker: bool,
    max_round: usize,
    termination_token: String,
    temperature: Option<f32>,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl CoordinatorBuilder {
    pub fn policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn agent(mut self, agent: Arc<dyn ConversableAgent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<dyn ConversableAgent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Model behind the coordinator's own voice, also used for speaker selection
    /// unless [`selector_model`](Self::selector_model) is set.
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn selector_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.selector_model = Some(model);
        self
    }

    pub fn speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn allow_repeat_speaker(mut self, allow: bool) -> Self {
        self.allow_repeat_speaker = allow;
        self
    }

    pub fn max_round(mut self, max_round: usize) -> Self {
        self.max_round = max_round;
        self
    }

    pub fn termination_token(mut self, token: impl Into<String>) -> Self {
        self.termination_token = token.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn observer(mut self, observer: Box<dyn TranscriptObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Validate the roster and assemble the coordinator.
    pub fn build(self) -> Result<Coordinator> {
        if self.agents.is_empty() {
            return Err(GroupChatError::EmptyRoster);
        }
        let model = self.model.ok_or(GroupChatError::MissingModel)?;

        let mut seen_names = vec![self.name.as_str()];
        for agent in &self.agents {
            if seen_names.contains(&agent.name()) {
                return Err(GroupChatError::DuplicateAgent(agent.name().to_string()));
            }
            seen_names.push(agent.name());
        }

        let mut owners: HashMap<String, String> = HashMap::new();
        let mut definitions = Vec::new();
        for agent in &self.agents {
            for definition in agent.tool_definitions() {
                if let Some(first) = owners.get(&definition.name) {
                    return Err(GroupChatError::DuplicateFunction {
                        function: definition.name,
                        first: first.clone(),
                        second: agent.name().to_string(),
                    });
                }
                owners.insert(definition.name.clone(), agent.name().to_string());
                definitions.push(definition);
            }
        }

        let has_human = self.agents.iter().any(|a| a.is_human_proxy());
        if self.selection == SpeakerSelection::Hub && !has_human {
            return Err(GroupChatError::NoHumanProxy(self.selection.as_str()));
        }

        let mut voice = AssistantAgent::new(&self.name, model.clone())
            .system_message(&self.policy)
            .with_description(&self.description)
            .advertise(definitions);
        if let Some(temperature) = self.temperature {
            voice = voice.temperature(temperature);
        }

        // The voice sits right after the human proxy so round robin reads naturally
        let mut agents = self.agents;
        let coordinator = agents
            .iter()
            .position(|a| a.is_human_proxy())
            .map(|h| h + 1)
            .unwrap_or(0);
        agents.insert(coordinator, Arc::new(voice));

        let selector = SpeakerSelector::new(self.selection, &self.termination_token)
            .with_model(self.selector_model.unwrap_or(model))
            .allow_repeat_speaker(self.allow_repeat_speaker);

        info!(
            coordinator = %self.name,
            participants = agents.len(),
            functions = owners.len(),
            selection = self.selection.as_str(),
            max_round = self.max_round,
            "Group chat assembled"
        );

        Ok(Coordinator {
            name: self.name,
            agents,
            coordinator,
            selector,
            max_round: self.max_round,
            termination_token: self.termination_token,
            observers: self.observers,
        })
    }
}

// =============================================================================
// Coordinator
// =============================================================================

pub struct Coordinator {
    name: String,
    agents: Vec<Arc<dyn ConversableAgent>>,
    coordinator: usize,
    selector: SpeakerSelector,
    max_round: usize,
    termination_token: String,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl Coordinator {
    pub fn builder(name: impl Into<String>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            name: name.into(),
            policy: String::new(),
            description: "Coordinates the group and decides what happens next.".to_string(),
            agents: Vec::new(),
            model: None,
            selector_model: None,
            selection: SpeakerSelection::default(),
            allow_repeat_speaker: true,
            max_round: DEFAULT_MAX_ROUND,
            termination_token: TERMINATION_TOKEN.to_string(),
            temperature: None,
            observers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Participant names in turn order, the coordinator's voice included.
    pub fn participant_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Run one session started by `initiator`.
    pub async fn run(
        &self,
        initiator: &str,
        initial_message: impl Into<String>,
    ) -> Result<SessionOutcome> {
        if !self.agents.iter().any(|a| a.name() == initiator) {
            return Err(GroupChatError::UnknownAgent(initiator.to_string()));
        }

        let mut transcript = Vec::new();
        self.append(&mut transcript, ChatMessage::text(initiator, initial_message));

        while transcript.len() < self.max_round {
            if let Some(by) = self.terminated_by(&transcript) {
                info!(by = %by, messages = transcript.len(), "Session terminated");
                return Ok(SessionOutcome {
                    transcript,
                    reason: StopReason::Terminated { by },
                });
            }

            let message = match self
                .selector
                .select(&self.agents, self.coordinator, &transcript)
                .await?
            {
                NextTurn::Speaker(index) => {
                    let speaker = &self.agents[index];
                    debug!(round = transcript.len(), speaker = speaker.name(), "Next speaker");
                    speaker.generate_reply(&transcript).await?
                }
                NextTurn::Unroutable(calls) => self.reject_calls(&calls),
            };

            self.append(&mut transcript, message);
        }

        if let Some(by) = self.terminated_by(&transcript) {
            return Ok(SessionOutcome {
                transcript,
                reason: StopReason::Terminated { by },
            });
        }

        warn!(max_round = self.max_round, "Session reached the round limit");
        Ok(SessionOutcome {
            transcript,
            reason: StopReason::MaxRounds,
        })
    }

    fn append(&self, transcript: &mut Vec<ChatMessage>, message: ChatMessage) {
        for observer in &self.observers {
            observer.on_message(&message, &self.name);
        }
        transcript.push(message);
    }

    fn terminated_by(&self, transcript: &[ChatMessage]) -> Option<String> {
        let last = transcript.last()?;
        let sender_is_human = self
            .agents
            .iter()
            .any(|a| a.is_human_proxy() && a.name() == last.sender);

        (sender_is_human && last.is_termination(&self.termination_token))
            .then(|| last.sender.clone())
    }

    fn reject_calls(&self, calls: &[ToolCall]) -> ChatMessage {
        warn!(
            functions = ?calls.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "Tool call names no registered function"
        );
        let results = calls
            .iter()
            .map(|call| ToolResult {
                call_id: call.id.clone(),
                name: call.name().to_string(),
                content: format!("Error: Function {} not found.", call.name()),
            })
            .collect();
        ChatMessage::tool_results(&self.name, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::human::ScriptedInput;
    use crate::user_proxy::{HumanInputMode, UserProxyAgent};
    use llm_client::testing::ScriptedChatModel;

    fn human(answers: &[&str]) -> Arc<dyn ConversableAgent> {
        Arc::new(
            UserProxyAgent::new("Human", Arc::new(ScriptedInput::new(answers.iter().copied())))
                .human_input_mode(HumanInputMode::Always),
        )
    }

    fn helper(name: &str) -> Arc<dyn ConversableAgent> {
        Arc::new(AssistantAgent::new(name, Arc::new(ScriptedChatModel::new())))
    }

    #[test]
    fn test_rejects_empty_roster() {
        let err = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, GroupChatError::EmptyRoster));
    }

    #[test]
    fn test_rejects_name_clash_with_coordinator() {
        let err = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .agent(human(&[]))
            .agent(helper("Boss"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, GroupChatError::DuplicateAgent(name) if name == "Boss"));
    }

    #[test]
    fn test_hub_needs_human_proxy() {
        let err = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .speaker_selection(SpeakerSelection::Hub)
            .agent(helper("Helper"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, GroupChatError::NoHumanProxy("hub")));
    }

    #[test]
    fn test_voice_follows_human_in_turn_order() {
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .agent(helper("Helper"))
            .agent(human(&[]))
            .build()
            .unwrap();
        assert_eq!(coordinator.participant_names(), vec!["Helper", "Human", "Boss"]);
    }

    #[tokio::test]
    async fn test_human_termination_ends_session() {
        let boss = ScriptedChatModel::new().with_text("Done here.");
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(boss))
            .speaker_selection(SpeakerSelection::Hub)
            .agent(human(&["TERMINATE"]))
            .build()
            .unwrap();

        let outcome = coordinator.run("Human", "Kick off").await.unwrap();

        assert_eq!(
            outcome.reason,
            StopReason::Terminated {
                by: "Human".to_string()
            }
        );
        let senders: Vec<&str> = outcome.transcript.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, vec!["Human", "Boss", "Human"]);
    }

    #[tokio::test]
    async fn test_coordinator_token_alone_does_not_terminate() {
        let boss = ScriptedChatModel::new()
            .with_text("All finished. TERMINATE")
            .with_text("Understood, continuing.");
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(boss))
            .speaker_selection(SpeakerSelection::Hub)
            .agent(human(&["one more thing", "TERMINATE"]))
            .build()
            .unwrap();

        let outcome = coordinator.run("Human", "Kick off").await.unwrap();

        assert!(outcome.is_terminated());
        assert_eq!(outcome.transcript.len(), 5);
        assert_eq!(outcome.transcript[2].content, "one more thing");
    }

    #[tokio::test]
    async fn test_empty_answer_to_termination_request_ends_session() {
        let boss = ScriptedChatModel::new()
            .with_text("Workflow complete. TERMINATE")
            .with_text("Continuing anyway");
        let input = ScriptedInput::new([""]);
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(boss.clone()))
            .speaker_selection(SpeakerSelection::Hub)
            .max_round(10)
            .agent(Arc::new(
                UserProxyAgent::new("Human", Arc::new(input.clone()))
                    .human_input_mode(HumanInputMode::Terminate),
            ))
            .build()
            .unwrap();

        let outcome = coordinator.run("Human", "start").await.unwrap();

        assert_eq!(
            outcome.reason,
            StopReason::Terminated {
                by: "Human".to_string()
            }
        );
        let senders: Vec<&str> = outcome.transcript.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, vec!["Human", "Boss", "Human"]);
        assert_eq!(outcome.transcript[2].content, "TERMINATE");
        assert_eq!(boss.call_count(), 1);
        assert_eq!(input.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_round_limit() {
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .speaker_selection(SpeakerSelection::Hub)
            .max_round(4)
            .agent(human(&["keep going", "and again"]))
            .build()
            .unwrap();

        let outcome = coordinator.run("Human", "Kick off").await.unwrap();

        assert_eq!(outcome.reason, StopReason::MaxRounds);
        assert_eq!(outcome.transcript.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_function_gets_error_result() {
        let boss = ScriptedChatModel::new()
            .with_tool_call("launch_rocket", serde_json::json!({}))
            .with_text("That function does not exist.");
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(boss))
            .speaker_selection(SpeakerSelection::Hub)
            .agent(human(&["TERMINATE"]))
            .build()
            .unwrap();

        let outcome = coordinator.run("Human", "Launch").await.unwrap();

        let rejection = &outcome.transcript[2];
        assert_eq!(rejection.sender, "Boss");
        assert_eq!(
            rejection.tool_results[0].content,
            "Error: Function launch_rocket not found."
        );
        assert_eq!(outcome.transcript[3].content, "That function does not exist.");
        assert!(outcome.is_terminated());
    }

    #[tokio::test]
    async fn test_unknown_initiator() {
        let coordinator = Coordinator::builder("Boss")
            .model(Arc::new(ScriptedChatModel::new()))
            .agent(human(&[]))
            .build()
            .unwrap();

        let err = coordinator.run("Stranger", "hi").await.unwrap_err();
        assert!(matches!(err, GroupChatError::UnknownAgent(_)));
    }
}
