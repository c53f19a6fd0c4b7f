//! Human proxy participant.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::agent::ConversableAgent;
use crate::error::Result;
use crate::human::HumanInput;
use crate::message::{ChatMessage, TERMINATION_TOKEN};

/// When the human is asked for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanInputMode {
    /// Every turn
    Always,
    /// Only when the previous message mentions the termination token, or the
    /// auto-reply budget is spent
    Terminate,
    /// Never; once the auto-reply budget is spent the proxy ends the session
    Never,
}

impl std::str::FromStr for HumanInputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "terminate" => Ok(Self::Terminate),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown human input mode: {}", other)),
        }
    }
}

pub struct UserProxyAgent {
    name: String,
    system_message: String,
    mode: HumanInputMode,
    input: Arc<dyn HumanInput>,
    max_consecutive_auto_reply: usize,
    auto_replies: AtomicUsize,
    default_auto_reply: String,
    termination_token: String,
}

impl UserProxyAgent {
    pub fn new(name: impl Into<String>, input: Arc<dyn HumanInput>) -> Self {
        Self {
            name: name.into(),
            system_message: String::new(),
            mode: HumanInputMode::Always,
            input,
            max_consecutive_auto_reply: 10,
            auto_replies: AtomicUsize::new(0),
            default_auto_reply: "Please continue.".to_string(),
            termination_token: TERMINATION_TOKEN.to_string(),
        }
    }

    pub fn system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    pub fn human_input_mode(mut self, mode: HumanInputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn max_consecutive_auto_reply(mut self, max: usize) -> Self {
        self.max_consecutive_auto_reply = max;
        self
    }

    pub fn default_auto_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_auto_reply = reply.into();
        self
    }

    pub fn termination_token(mut self, token: impl Into<String>) -> Self {
        self.termination_token = token.into();
        self
    }

    fn budget_spent(&self) -> bool {
        self.auto_replies.load(Ordering::SeqCst) >= self.max_consecutive_auto_reply
    }

    fn auto_reply(&self) -> ChatMessage {
        self.auto_replies.fetch_add(1, Ordering::SeqCst);
        ChatMessage::text(&self.name, &self.default_auto_reply)
    }

    /// Prompt the human. With `empty_ends` set, an empty answer ends the session
    /// instead of sending the auto-reply.
    async fn ask_human(&self, transcript: &[ChatMessage], empty_ends: bool) -> Result<ChatMessage> {
        let sender = transcript.last().map(|m| m.sender.as_str()).unwrap_or("the group");
        let prompt = if empty_ends {
            format!(
                "Provide feedback to {}. Press enter or type {} to end the session",
                sender, self.termination_token
            )
        } else {
            format!(
                "Provide feedback to {}. Press enter to use the auto-reply, or type {} to end the session",
                sender, self.termination_token
            )
        };

        let answer = self.input.prompt(&prompt).await?;
        if answer.trim().is_empty() {
            if empty_ends {
                debug!(agent = %self.name, "Empty human input at termination request, ending session");
                return Ok(ChatMessage::text(&self.name, &self.termination_token));
            }
            debug!(agent = %self.name, "Empty human input, sending auto-reply");
            return Ok(self.auto_reply());
        }

        self.auto_replies.store(0, Ordering::SeqCst);
        Ok(ChatMessage::text(&self.name, answer))
    }
}

#[async_trait]
impl ConversableAgent for UserProxyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.system_message
    }

    fn is_human_proxy(&self) -> bool {
        true
    }

    async fn generate_reply(&self, transcript: &[ChatMessage]) -> Result<ChatMessage> {
        let asked_to_stop = transcript
            .last()
            .is_some_and(|m| m.mentions(&self.termination_token));

        match self.mode {
            HumanInputMode::Always => self.ask_human(transcript, false).await,
            HumanInputMode::Terminate if asked_to_stop => self.ask_human(transcript, true).await,
            HumanInputMode::Terminate if self.budget_spent() => {
                self.ask_human(transcript, false).await
            }
            HumanInputMode::Terminate => Ok(self.auto_reply()),
            HumanInputMode::Never if self.budget_spent() => {
                debug!(agent = %self.name, "Auto-reply budget spent, ending session");
                Ok(ChatMessage::text(&self.name, &self.termination_token))
            }
            HumanInputMode::Never => Ok(self.auto_reply()),
        }
    }
}
