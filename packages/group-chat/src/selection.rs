//! Choosing who speaks next.
//!
//! Two rules apply before the configured method: outstanding tool calls go to the
//! participant that registered the function, and a non-human message that mentions
//! the termination token hands the floor to the human proxy.

use llm_client::{truncate_to_char_boundary, ChatModel, ChatRequest, Message, ToolCall};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::agent::ConversableAgent;
use crate::error::Result;
use crate::message::{pending_tool_calls, ChatMessage};

/// Per-message cap when showing the conversation to the selector model.
const SELECTOR_MESSAGE_BYTES: usize = 2000;

/// Number of trailing messages the selector model sees.
const SELECTOR_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeakerSelection {
    /// A chat model picks the next speaker by name
    #[default]
    Auto,
    /// Roster order
    RoundRobin,
    /// The coordinator speaks between every other participant and hands plain
    /// messages to the human proxy
    Hub,
}

impl SpeakerSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::RoundRobin => "round_robin",
            Self::Hub => "hub",
        }
    }
}

impl std::str::FromStr for SpeakerSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "round_robin" | "round-robin" => Ok(Self::RoundRobin),
            "hub" => Ok(Self::Hub),
            other => Err(format!("unknown speaker selection method: {}", other)),
        }
    }
}

/// Outcome of a selection round.
#[derive(Debug, Clone, PartialEq)]
pub enum NextTurn {
    /// Index into the roster
    Speaker(usize),
    /// Calls to functions nobody registered
    Unroutable(Vec<ToolCall>),
}

pub struct SpeakerSelector {
    method: SpeakerSelection,
    model: Option<Arc<dyn ChatModel>>,
    allow_repeat_speaker: bool,
    termination_token: String,
}

impl SpeakerSelector {
    pub fn new(method: SpeakerSelection, termination_token: impl Into<String>) -> Self {
        Self {
            method,
            model: None,
            allow_repeat_speaker: true,
            termination_token: termination_token.into(),
        }
    }

    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn allow_repeat_speaker(mut self, allow: bool) -> Self {
        self.allow_repeat_speaker = allow;
        self
    }

    pub fn method(&self) -> SpeakerSelection {
        self.method
    }

    /// Pick the next turn. `coordinator` is the roster index of the coordinator's voice.
    pub async fn select(
        &self,
        agents: &[Arc<dyn ConversableAgent>],
        coordinator: usize,
        transcript: &[ChatMessage],
    ) -> Result<NextTurn> {
        let pending = pending_tool_calls(transcript);
        if let Some(first) = pending.first() {
            if let Some(owner) = agents.iter().position(|a| a.owns_tool(first.name())) {
                debug!(function = first.name(), owner = agents[owner].name(), "Routing tool call");
                return Ok(NextTurn::Speaker(owner));
            }
            let unroutable = pending
                .into_iter()
                .filter(|call| !agents.iter().any(|a| a.owns_tool(call.name())))
                .cloned()
                .collect();
            return Ok(NextTurn::Unroutable(unroutable));
        }

        let Some(last) = transcript.last() else {
            return Ok(NextTurn::Speaker(coordinator));
        };
        let last_index = agents.iter().position(|a| a.name() == last.sender);
        let human = agents.iter().position(|a| a.is_human_proxy());

        if let Some(human) = human {
            if last_index != Some(human) && last.mentions(&self.termination_token) {
                return Ok(NextTurn::Speaker(human));
            }
        }

        let next = match self.method {
            SpeakerSelection::RoundRobin => round_robin(agents.len(), last_index),
            SpeakerSelection::Hub => match (last_index, human) {
                (Some(i), Some(h)) if i == coordinator && last.tool_results.is_empty() => h,
                _ => coordinator,
            },
            SpeakerSelection::Auto => self.ask_model(agents, last_index, transcript).await?,
        };

        Ok(NextTurn::Speaker(next))
    }

    async fn ask_model(
        &self,
        agents: &[Arc<dyn ConversableAgent>],
        last_index: Option<usize>,
        transcript: &[ChatMessage],
    ) -> Result<usize> {
        let fallback = round_robin(agents.len(), last_index);
        let Some(model) = &self.model else {
            return Ok(fallback);
        };

        let candidates: Vec<usize> = (0..agents.len())
            .filter(|&i| self.allow_repeat_speaker || Some(i) != last_index)
            .collect();
        if candidates.len() == 1 {
            return Ok(candidates[0]);
        }

        let names: Vec<&str> = candidates.iter().map(|&i| agents[i].name()).collect();
        let request = ChatRequest::new()
            .message(Message::system(selector_system_message(agents, &candidates)))
            .message(Message::user(render_conversation(transcript)))
            .message(Message::system(format!(
                "Read the conversation above. Then select the next role from {:?} to play. Only return the role.",
                names
            )));

        let response = model.complete(request).await?;
        let mentioned = mentioned_agents(response.content(), &names);

        if let [only] = mentioned.as_slice() {
            return Ok(candidates[*only]);
        }

        warn!(
            reply = %response.content(),
            mentioned = mentioned.len(),
            "Speaker selection reply did not name exactly one agent, using roster order"
        );
        Ok(fallback)
    }
}

fn round_robin(len: usize, last_index: Option<usize>) -> usize {
    match last_index {
        Some(i) => (i + 1) % len,
        None => 0,
    }
}

fn selector_system_message(agents: &[Arc<dyn ConversableAgent>], candidates: &[usize]) -> String {
    let roles: Vec<String> = candidates
        .iter()
        .map(|&i| format!("{}: {}", agents[i].name(), agents[i].description()))
        .collect();
    format!(
        "You are in a role play game. The following roles are available:\n{}\n\nRead the following conversation.",
        roles.join("\n")
    )
}

fn render_conversation(transcript: &[ChatMessage]) -> String {
    let start = transcript.len().saturating_sub(SELECTOR_WINDOW);
    transcript[start..]
        .iter()
        .map(|m| {
            let mut text = truncate_to_char_boundary(&m.content, SELECTOR_MESSAGE_BYTES).to_string();
            for call in &m.tool_calls {
                text.push_str(&format!("\n[calls {}]", call.name()));
            }
            for result in &m.tool_results {
                text.push_str(&format!("\n[result of {}]", result.name));
            }
            format!("{}: {}", m.sender, text.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Indices of the names that appear in `text` as whole words, in roster order.
pub fn mentioned_agents(text: &str, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| contains_word(text, name))
        .map(|(i, _)| i)
        .collect()
}

fn contains_word(text: &str, word: &str) -> bool {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
