//! Where a human proxy gets its input.

use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{GroupChatError, Result};

#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Ask the human for a line of input. An empty string means "skip".
    async fn prompt(&self, prompt: &str) -> Result<String>;
}

/// Reads from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalInput;

#[async_trait]
impl HumanInput for TerminalInput {
    async fn prompt(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await
        .map_err(|e| GroupChatError::HumanInput(e.to_string()))?
        .map_err(|e| GroupChatError::HumanInput(e.to_string()))
    }
}

/// Replays canned answers; answers with an empty string once they run out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    answers: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl HumanInput for ScriptedInput {
    async fn prompt(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_input_replays_then_goes_quiet() {
        let input = ScriptedInput::new(["looks good", "TERMINATE"]);

        assert_eq!(input.prompt("first?").await.unwrap(), "looks good");
        assert_eq!(input.prompt("second?").await.unwrap(), "TERMINATE");
        assert_eq!(input.prompt("third?").await.unwrap(), "");
        assert_eq!(input.prompts(), vec!["first?", "second?", "third?"]);
    }
}
