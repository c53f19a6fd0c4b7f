//! Chat transcript entries.

use chrono::{DateTime, Utc};
use llm_client::ToolCall;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Literal token that ends a session when a human proxy sends it.
pub const TERMINATION_TOKEN: &str = "TERMINATE";

/// Output of one executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    /// JSON text, or `Error: ...` when the call failed
    pub content: String,
}

/// One entry in the append-only transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn text(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn tool_results(sender: impl Into<String>, results: Vec<ToolResult>) -> Self {
        Self {
            tool_results: results,
            ..Self::text(sender, "")
        }
    }

    /// Trimmed content ends with `token`.
    pub fn is_termination(&self, token: &str) -> bool {
        self.content.trim_end().ends_with(token)
    }

    /// Content mentions `token` anywhere.
    pub fn mentions(&self, token: &str) -> bool {
        self.content.contains(token)
    }
}

/// Tool calls from the latest message that requested any, minus those already answered.
pub fn pending_tool_calls(transcript: &[ChatMessage]) -> Vec<&ToolCall> {
    let Some(index) = transcript.iter().rposition(|m| !m.tool_calls.is_empty()) else {
        return Vec::new();
    };

    let answered: HashSet<&str> = transcript[index + 1..]
        .iter()
        .flat_map(|m| m.tool_results.iter().map(|r| r.call_id.as_str()))
        .collect();

    transcript[index]
        .tool_calls
        .iter()
        .filter(|call| !answered.contains(call.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall::new(id, name, "{}")
    }

    fn result(id: &str, name: &str) -> ToolResult {
        ToolResult {
            call_id: id.into(),
            name: name.into(),
            content: "{}".into(),
        }
    }

    #[test]
    fn test_termination_requires_token_at_end() {
        assert!(ChatMessage::text("Risk_Manager", "TERMINATE").is_termination(TERMINATION_TOKEN));
        assert!(ChatMessage::text("Risk_Manager", "All done. TERMINATE \n")
            .is_termination(TERMINATION_TOKEN));
        assert!(!ChatMessage::text("Risk_Manager", "TERMINATE later please")
            .is_termination(TERMINATION_TOKEN));
        assert!(ChatMessage::text("Risk_Manager", "TERMINATE later please")
            .mentions(TERMINATION_TOKEN));
    }

    #[test]
    fn test_no_pending_calls_in_plain_chat() {
        let transcript = vec![
            ChatMessage::text("Risk_Manager", "start"),
            ChatMessage::text("Risk_Assessment_Manager", "ok"),
        ];
        assert!(pending_tool_calls(&transcript).is_empty());
    }

    #[test]
    fn test_pending_calls_shrink_as_results_arrive() {
        let mut transcript = vec![ChatMessage::text("Risk_Assessment_Manager", "")
            .with_tool_calls(vec![
                call("call_1", "scan_internal_data"),
                call("call_2", "analyze_market_industry"),
            ])];

        let pending: Vec<&str> = pending_tool_calls(&transcript)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(pending, vec!["call_1", "call_2"]);

        transcript.push(ChatMessage::tool_results(
            "Internal_Data_Scanner",
            vec![result("call_1", "scan_internal_data")],
        ));
        let pending: Vec<&str> = pending_tool_calls(&transcript)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(pending, vec!["call_2"]);

        transcript.push(ChatMessage::tool_results(
            "Market_Industry_Analyst",
            vec![result("call_2", "analyze_market_industry")],
        ));
        assert!(pending_tool_calls(&transcript).is_empty());
    }

    #[test]
    fn test_serialization_skips_empty_tool_fields() {
        let value = serde_json::to_value(ChatMessage::text("a", "b")).unwrap();
        assert!(value.get("tool_calls").is_none());
        assert!(value.get("tool_results").is_none());
        assert!(value.get("timestamp").is_some());
    }
}
