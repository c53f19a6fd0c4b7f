//! Chat completion request and response types (OpenAI wire format).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::tool::ToolDefinition;

// =============================================================================
// Messages
// =============================================================================

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry of the `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    /// Message content. Assistant messages that only carry tool calls have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Participant name, used to tell group chat speakers apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Set on `tool` messages to match the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Assistant turn asking for one or more function calls.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            name: None,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Answer to the function call `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }

    /// Attach a participant name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Content as a string slice, empty when absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Tool Calls
// =============================================================================

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The ID of this tool call (for matching responses).
    pub id: String,

    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,

    pub function: FunctionCall,
}

/// Function name and JSON-encoded arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    /// The arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Create a function tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// The name of the function to call.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// The raw JSON arguments.
    pub fn arguments(&self) -> &str {
        &self.function.arguments
    }

    /// Parse arguments into a typed struct.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(normalize_arguments(&self.function.arguments))
    }
}

/// Models sometimes send an empty string for functions without parameters.
pub(crate) fn normalize_arguments(arguments: &str) -> &str {
    if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    }
}

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request, independent of the endpoint and model that serve it.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,

    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,

    /// Sampling temperature (0.0 to 2.0); the router default applies when unset
    pub temperature: Option<f32>,

    /// Completion length cap
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the conversation.
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Offer tools to the model.
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the JSON body sent to `/chat/completions` for a given model.
    pub fn to_body(&self, model: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = serde_json::Value::Array(
                self.tools.iter().map(ToolDefinition::to_request_entry).collect(),
            );
            body["tool_choice"] = serde_json::json!("auto");
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }
}

/// First choice of a completion, with usage when the endpoint reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant message (text, tool calls, or both)
    pub message: Message,

    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// A plain text assistant response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            usage: None,
        }
    }

    /// An assistant response requesting tool calls.
    pub fn tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            message: Message::assistant_tool_calls(content, tool_calls),
            usage: None,
        }
    }

    /// Response content, empty when the model only requested tools.
    pub fn content(&self) -> &str {
        self.message.text()
    }
}

/// Body of a `/chat/completions` reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// =============================================================================
// Utilities
// =============================================================================

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .take_while(|end| *end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("You are helpful").role, Role::System);
        assert_eq!(Message::user("Hello").role, Role::User);
        assert_eq!(Message::assistant("Hi there").role, Role::Assistant);

        let tool = Message::tool("call_1", "{}");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_tool_call_message_serializes_without_content() {
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("call_1", "scan_internal_data", "{}")],
        );
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["role"], "assistant");
        assert!(value.get("content").is_none());
        assert_eq!(value["tool_calls"][0]["type"], "function");
        assert_eq!(value["tool_calls"][0]["function"]["name"], "scan_internal_data");
    }

    #[test]
    fn test_tool_call_parsing() {
        let value = serde_json::json!({
            "id": "call_123",
            "type": "function",
            "function": {
                "name": "echo",
                "arguments": "{\"message\": \"hello\"}"
            }
        });

        let call: ToolCall = serde_json::from_value(value).unwrap();
        assert_eq!(call.id, "call_123");
        assert_eq!(call.name(), "echo");

        let args: serde_json::Value = call.parse_args().unwrap();
        assert_eq!(args["message"], "hello");
    }

    #[test]
    fn test_empty_arguments_parse_as_empty_object() {
        let call = ToolCall::new("call_1", "run_monitoring_cycle", "");
        let args: serde_json::Map<String, serde_json::Value> = call.parse_args().unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_request_body() {
        let request = ChatRequest::new()
            .message(Message::user("Hello").named("Risk_Manager"))
            .temperature(0.1);
        let body = request.to_body("gpt-4o");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["name"], "Risk_Manager");
        assert!(body.get("tools").is_none());
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_truncate_keeps_whole_characters() {
        // "风险" is two 3-byte characters
        assert_eq!(truncate_to_char_boundary("VaR 风险", 8), "VaR 风");
        assert_eq!(truncate_to_char_boundary("VaR 风险", 6), "VaR ");
        assert_eq!(truncate_to_char_boundary("VaR", 10), "VaR");
        assert_eq!(truncate_to_char_boundary("风", 2), "");
    }
}
