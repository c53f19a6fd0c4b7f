//! Post-session extraction of the coordinator's final report.

use group_chat::ChatMessage;
use serde::Serialize;

const REQUIRED_PHRASES: [&str; 2] = ["prioritized risk list", "response strategies"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    /// Position of the message in the transcript
    pub index: usize,
    pub report_summary_content: String,
}

/// The last message from `coordinator` that presents both the prioritized risk
/// list and the response strategies.
pub fn extract_final_report(transcript: &[ChatMessage], coordinator: &str) -> Option<FinalReport> {
    transcript
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, m)| m.sender == coordinator)
        .find(|(_, m)| {
            let content = m.content.to_lowercase();
            REQUIRED_PHRASES.iter().all(|phrase| content.contains(phrase))
        })
        .map(|(index, m)| FinalReport {
            index,
            report_summary_content: m.content.clone(),
        })
}
