// Common test utilities

use group_chat::{format_message, ChatMessage, TranscriptObserver};
use std::sync::{Arc, Mutex};

/// Install a test-friendly tracing subscriber once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_workflow=debug,group_chat=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Observer that keeps every rendered message for assertions.
#[derive(Clone, Default)]
pub struct RecordingTranscript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingTranscript {
    pub fn rendered(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }

    pub fn count(&self) -> usize {
        self.lines.lock().unwrap().len()
    }
}

impl TranscriptObserver for RecordingTranscript {
    fn on_message(&self, message: &ChatMessage, recipient: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format_message(message, recipient, false));
    }
}
