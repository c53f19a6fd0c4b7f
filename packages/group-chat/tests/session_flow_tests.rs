//! Whole-session tests driven by scripted models and scripted human input.

mod common;

use async_trait::async_trait;
use common::{init_tracing, RecordingTranscript};
use group_chat::{
    AssistantAgent, ConversableAgent, Coordinator, GroupChatError, HumanInputMode, ScriptedInput,
    SpeakerSelection, StopReason, UserProxyAgent,
};
use llm_client::testing::ScriptedChatModel;
use llm_client::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, JsonSchema)]
struct ScanArgs {
    /// Which ledger to scan
    ledger: Option<String>,
}

struct ScanLedger;

#[async_trait]
impl Tool for ScanLedger {
    const NAME: &'static str = "scan_ledger";
    type Args = ScanArgs;
    type Output = serde_json::Value;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "Scan a ledger for anomalies"
    }

    async fn call(&self, args: ScanArgs) -> Result<Self::Output, Self::Error> {
        Ok(serde_json::json!({
            "ledger": args.ledger.unwrap_or_else(|| "general".into()),
            "anomalies": ["Q1 expense variance"],
        }))
    }
}

fn human(input: &ScriptedInput) -> Arc<dyn ConversableAgent> {
    Arc::new(
        UserProxyAgent::new("Human", Arc::new(input.clone()))
            .human_input_mode(HumanInputMode::Terminate),
    )
}

#[tokio::test]
async fn auto_selection_routes_calls_and_waits_for_human() {
    init_tracing();

    let boss = ScriptedChatModel::new()
        .with_tool_call("scan_ledger", serde_json::json!({"ledger": "payables"}))
        .with_text("Scan complete, one anomaly found. TERMINATE");
    let selector = ScriptedChatModel::new().with_text("Boss").with_text("Boss");
    let scanner_model = ScriptedChatModel::new();
    let input = ScriptedInput::new(["TERMINATE"]);
    let recorder = RecordingTranscript::default();

    let coordinator = Coordinator::builder("Boss")
        .policy("Run the scan, then report.")
        .model(Arc::new(boss.clone()))
        .selector_model(Arc::new(selector.clone()))
        .speaker_selection(SpeakerSelection::Auto)
        .agent(human(&input))
        .agent(Arc::new(
            AssistantAgent::new("Scanner", Arc::new(scanner_model.clone()))
                .with_description("Scans ledgers")
                .tool(ScanLedger),
        ))
        .observer(Box::new(recorder.clone()))
        .build()
        .unwrap();

    let outcome = coordinator.run("Human", "Please scan the payables").await.unwrap();

    assert_eq!(
        outcome.reason,
        StopReason::Terminated {
            by: "Human".into()
        }
    );
    let senders: Vec<&str> = outcome.transcript.iter().map(|m| m.sender.as_str()).collect();
    assert_eq!(senders, vec!["Human", "Boss", "Scanner", "Boss", "Human"]);

    let result = &outcome.transcript[2].tool_results[0];
    assert_eq!(result.name, "scan_ledger");
    assert!(result.content.contains("payables"));

    // Tool routing and the termination hand-off bypass the selector
    assert_eq!(selector.call_count(), 2);
    assert_eq!(scanner_model.call_count(), 0);
    assert_eq!(input.prompts().len(), 1);

    // The coordinator offered the scanner's function to its model
    let first = &boss.requests()[0];
    assert_eq!(first.tools[0].name, "scan_ledger");
    assert_eq!(first.messages[0].text(), "Run the scan, then report.");

    assert_eq!(recorder.count(), 5);
    assert!(recorder
        .rendered()
        .contains("Scanner (to Boss):\n\n***** Response from calling tool (call_1) *****"));
}

#[tokio::test]
async fn duplicate_function_names_are_rejected() {
    init_tracing();

    let model = Arc::new(ScriptedChatModel::new());
    let err = Coordinator::builder("Boss")
        .model(model.clone())
        .agent(Arc::new(AssistantAgent::new("First", model.clone()).tool(ScanLedger)))
        .agent(Arc::new(AssistantAgent::new("Second", model).tool(ScanLedger)))
        .build()
        .err()
        .unwrap();

    match err {
        GroupChatError::DuplicateFunction {
            function,
            first,
            second,
        } => {
            assert_eq!(function, "scan_ledger");
            assert_eq!(first, "First");
            assert_eq!(second, "Second");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn session_without_human_reply_hits_round_limit() {
    init_tracing();

    let input = ScriptedInput::default();
    let coordinator = Coordinator::builder("Boss")
        .model(Arc::new(ScriptedChatModel::new()))
        .speaker_selection(SpeakerSelection::RoundRobin)
        .max_round(6)
        .agent(human(&input))
        .build()
        .unwrap();

    let outcome = coordinator.run("Human", "Start").await.unwrap();

    assert_eq!(outcome.reason, StopReason::MaxRounds);
    assert_eq!(outcome.transcript.len(), 6);
    assert!(outcome.messages_from("Boss").count() >= 2);
}
