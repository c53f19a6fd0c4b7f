//! Scripted chat model for tests.
//!
//! Replays queued responses in order and records every request it receives.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse, ToolCall};
use crate::ChatModel;

/// Reply used once the queue runs dry.
pub const DEFAULT_MOCK_REPLY: &str = "Mock AI response";

#[derive(Clone, Default)]
pub struct ScriptedChatModel {
    responses: Arc<Mutex<Vec<ChatResponse>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    next_call_id: Arc<AtomicUsize>,
}

impl ScriptedChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prepared response to the queue
    pub fn with_response(self, response: ChatResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Add a plain text reply to the queue
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_response(ChatResponse::text(content))
    }

    /// Add a reply requesting a single tool call
    pub fn with_tool_call(self, name: &str, arguments: serde_json::Value) -> Self {
        self.with_tool_calls(&[(name, arguments)])
    }

    /// Add a reply requesting several tool calls at once
    pub fn with_tool_calls(self, calls: &[(&str, serde_json::Value)]) -> Self {
        let calls = calls
            .iter()
            .map(|(name, arguments)| {
                let id = self.next_call_id.fetch_add(1, Ordering::SeqCst) + 1;
                ToolCall::new(format!("call_{}", id), *name, arguments.to_string())
            })
            .collect();
        self.with_response(ChatResponse::tool_calls(None, calls))
    }

    /// Get all requests that were sent to the model
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the last request sent to the model
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Check if any request carried a message containing the given text
    pub fn was_called_with(&self, text: &str) -> bool {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.messages.iter().any(|m| m.text().contains(text)))
    }

    /// Get the number of times the model was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Responses still waiting in the queue
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            Ok(ChatResponse::text(DEFAULT_MOCK_REPLY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[tokio::test]
    async fn test_replays_in_order_then_defaults() {
        let model = ScriptedChatModel::new()
            .with_text("first")
            .with_tool_call("scan_internal_data", serde_json::json!({}));

        let request = ChatRequest::new().message(Message::user("go"));

        assert_eq!(model.complete(request.clone()).await.unwrap().content(), "first");

        let second = model.complete(request.clone()).await.unwrap();
        assert_eq!(second.message.tool_calls[0].name(), "scan_internal_data");
        assert_eq!(second.message.tool_calls[0].id, "call_1");

        assert_eq!(
            model.complete(request).await.unwrap().content(),
            DEFAULT_MOCK_REPLY
        );
        assert_eq!(model.call_count(), 3);
        assert!(model.was_called_with("go"));
    }

    #[test]
    fn test_call_ids_are_unique() {
        let model = ScriptedChatModel::new().with_tool_calls(&[
            ("perform_quantitative_assessment", serde_json::json!({"risk_id": "R1"})),
            ("perform_qualitative_assessment", serde_json::json!({"risk_id": "R1"})),
        ]);

        let responses = model.responses.lock().unwrap();
        let ids: Vec<&str> = responses[0]
            .message
            .tool_calls
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["call_1", "call_2"]);
    }

    #[test]
    fn test_clones_share_queue_and_history() {
        let model = ScriptedChatModel::new().with_text("only");
        let handle = model.clone();

        let request = ChatRequest::new().message(Message::user("hi"));
        let response = tokio_test::block_on(model.complete(request)).unwrap();

        assert_eq!(response.content(), "only");
        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.remaining(), 0);
        assert_eq!(handle.last_request().unwrap().messages[0].text(), "hi");
    }
}
