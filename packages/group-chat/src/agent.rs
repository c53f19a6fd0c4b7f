//! Chat participants.
//!
//! A participant reads the whole transcript and produces the next message when the
//! coordinator gives it the floor. [`AssistantAgent`] is the model-backed kind: it
//! executes tool calls addressed to functions it registered, and otherwise asks its
//! chat model what to say.

use async_trait::async_trait;
use llm_client::{ChatModel, ChatRequest, ErasedTool, Message, ToolCall, ToolDefinition};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::message::{pending_tool_calls, ChatMessage, ToolResult};

#[async_trait]
pub trait ConversableAgent: Send + Sync {
    fn name(&self) -> &str;

    /// Short role description shown to the speaker selector.
    fn description(&self) -> &str;

    /// Functions this agent executes.
    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    fn owns_tool(&self, name: &str) -> bool {
        self.tool_definitions().iter().any(|t| t.name == name)
    }

    fn is_human_proxy(&self) -> bool {
        false
    }

    /// Produce this agent's next message.
    async fn generate_reply(&self, transcript: &[ChatMessage]) -> Result<ChatMessage>;
}

// =============================================================================
// Assistant Agent
// =============================================================================

pub struct AssistantAgent {
    name: String,
    description: String,
    system_message: String,
    tools: Vec<Box<dyn ErasedTool>>,
    advertised: Vec<ToolDefinition>,
    model: Arc<dyn ChatModel>,
    temperature: Option<f32>,
}

impl AssistantAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            system_message: "You are a helpful AI assistant.".to_string(),
            tools: Vec::new(),
            advertised: Vec::new(),
            model,
            temperature: None,
        }
    }

    pub fn system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Register a function this agent executes and offers to its model.
    pub fn tool<T: ErasedTool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Offer functions to the model that other participants execute.
    pub fn advertise(mut self, definitions: Vec<ToolDefinition>) -> Self {
        self.advertised.extend(definitions);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn get_system_message(&self) -> &str {
        &self.system_message
    }

    /// Every function the model may call: owned first, then advertised.
    pub fn callable_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| t.definition())
            .chain(self.advertised.iter().cloned())
            .collect()
    }

    async fn execute(&self, calls: Vec<&ToolCall>) -> ChatMessage {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let content = match self.tools.iter().find(|t| t.name() == call.name()) {
                Some(tool) => match tool.call_erased(call.arguments()).await {
                    Ok(output) => {
                        info!(agent = %self.name, function = call.name(), call_id = %call.id, "Function executed");
                        output
                    }
                    Err(e) => {
                        warn!(agent = %self.name, function = call.name(), error = %e, "Function call failed");
                        format!("Error: {}", e)
                    }
                },
                None => format!("Error: Function {} not found.", call.name()),
            };

            results.push(ToolResult {
                call_id: call.id.clone(),
                name: call.name().to_string(),
                content,
            });
        }

        ChatMessage::tool_results(&self.name, results)
    }

    /// Map the transcript onto chat roles from this agent's point of view.
    pub fn build_messages(&self, transcript: &[ChatMessage]) -> Vec<Message> {
        let mut messages = vec![Message::system(&self.system_message)];
        let mut issued: HashSet<&str> = HashSet::new();

        for msg in transcript {
            let own = msg.sender == self.name;

            if own && (!msg.content.is_empty() || !msg.tool_calls.is_empty()) {
                issued.extend(msg.tool_calls.iter().map(|c| c.id.as_str()));
                let content = (!msg.content.is_empty()).then(|| msg.content.clone());
                messages.push(Message::assistant_tool_calls(content, msg.tool_calls.clone()));
            }

            let mut parts = Vec::new();
            for result in &msg.tool_results {
                if issued.contains(result.call_id.as_str()) {
                    messages.push(Message::tool(&result.call_id, &result.content));
                } else {
                    parts.push(render_result(result));
                }
            }

            if !own {
                if !msg.content.is_empty() {
                    parts.push(msg.content.clone());
                }
                parts.extend(msg.tool_calls.iter().map(render_call));
            }

            if !parts.is_empty() {
                let text = parts.join("\n\n");
                messages.push(if own {
                    Message::assistant(text)
                } else {
                    Message::user(text).named(&msg.sender)
                });
            }
        }

        messages
    }
}

fn render_call(call: &ToolCall) -> String {
    format!(
        "Suggested tool call ({}): {}\nArguments: {}",
        call.id,
        call.name(),
        call.arguments()
    )
}

fn render_result(result: &ToolResult) -> String {
    format!(
        "Response from calling tool {} ({}):\n{}",
        result.name, result.call_id, result.content
    )
}

#[async_trait]
impl ConversableAgent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    fn owns_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    async fn generate_reply(&self, transcript: &[ChatMessage]) -> Result<ChatMessage> {
        let mine: Vec<&ToolCall> = pending_tool_calls(transcript)
            .into_iter()
            .filter(|call| self.owns_tool(call.name()))
            .collect();
        if !mine.is_empty() {
            return Ok(self.execute(mine).await);
        }

        let mut request = ChatRequest::new()
            .messages(self.build_messages(transcript))
            .tools(self.callable_tools());
        request.temperature = self.temperature;

        debug!(agent = %self.name, messages = request.messages.len(), "Requesting reply");
        let response = self.model.complete(request).await?;

        Ok(ChatMessage::text(&self.name, response.content())
            .with_tool_calls(response.message.tool_calls))
    }
}
