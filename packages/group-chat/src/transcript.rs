//! Transcript printing.

use colored::{Color, Colorize};

use crate::message::ChatMessage;

/// Notified of every message appended to the transcript.
pub trait TranscriptObserver: Send + Sync {
    fn on_message(&self, message: &ChatMessage, recipient: &str);
}

/// Prints the conversation to stdout as it happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTranscript;

impl TranscriptObserver for ConsoleTranscript {
    fn on_message(&self, message: &ChatMessage, recipient: &str) {
        println!("{}", format_message(message, recipient, true));
    }
}

/// Render one message. Styling is optional so the layout can be checked in tests.
pub fn format_message(message: &ChatMessage, recipient: &str, styled: bool) -> String {
    let paint = |text: String, color: Color| {
        if styled {
            text.color(color).to_string()
        } else {
            text
        }
    };

    let mut lines = vec![
        paint(format!("{} (to {}):", message.sender, recipient), Color::Yellow),
        String::new(),
    ];

    if !message.content.is_empty() {
        lines.push(message.content.clone());
    }

    for call in &message.tool_calls {
        lines.push(paint(
            format!("***** Suggested tool call ({}): {} *****", call.id, call.name()),
            Color::Green,
        ));
        lines.push("Arguments:".to_string());
        lines.push(pretty_json(call.arguments()));
        lines.push(paint("*".repeat(70), Color::Green));
    }

    for result in &message.tool_results {
        lines.push(paint(
            format!("***** Response from calling tool ({}) *****", result.call_id),
            Color::Green,
        ));
        lines.push(pretty_json(&result.content));
        lines.push(paint("*".repeat(70), Color::Green));
    }

    lines.push(String::new());
    lines.push(paint("-".repeat(80), Color::BrightBlack));
    lines.join("\n")
}

/// Pretty-print JSON text, leaving anything else untouched.
fn pretty_json(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolResult;
    use llm_client::ToolCall;

    #[test]
    fn test_plain_message_layout() {
        let msg = ChatMessage::text("Risk_Manager", "Start the annual risk assessment");
        let text = format_message(&msg, "Risk_Assessment_Manager", false);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Risk_Manager (to Risk_Assessment_Manager):");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Start the annual risk assessment");
        assert_eq!(lines.last().unwrap(), &"-".repeat(80));
    }

    #[test]
    fn test_tool_call_and_result_layout() {
        let call = ChatMessage::text("Risk_Assessment_Manager", "")
            .with_tool_calls(vec![ToolCall::new("call_7", "setup_monitoring", r#"{"risk_id":"RISK-001"}"#)]);
        let text = format_message(&call, "Risk_Assessment_Manager", false);

        assert!(text.contains("***** Suggested tool call (call_7): setup_monitoring *****"));
        assert!(text.contains("Arguments:\n{\n  \"risk_id\": \"RISK-001\"\n}"));

        let result = ChatMessage::tool_results(
            "Monitoring_Reporting_Agent",
            vec![ToolResult {
                call_id: "call_7".into(),
                name: "setup_monitoring".into(),
                content: "not json".into(),
            }],
        );
        let text = format_message(&result, "Risk_Assessment_Manager", false);
        assert!(text.contains("***** Response from calling tool (call_7) *****\nnot json"));
    }
}
