use llm_client::LlmError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GroupChatError>;

#[derive(Debug, Error)]
pub enum GroupChatError {
    #[error("Group chat needs at least one participant")]
    EmptyRoster,

    #[error("Agent name '{0}' is used more than once")]
    DuplicateAgent(String),

    #[error("Function '{function}' is registered by both {first} and {second}")]
    DuplicateFunction {
        function: String,
        first: String,
        second: String,
    },

    #[error("No participant named '{0}'")]
    UnknownAgent(String),

    #[error("Speaker selection '{0}' needs a human proxy in the roster")]
    NoHumanProxy(&'static str),

    #[error("Coordinator has no chat model")]
    MissingModel,

    #[error("Human input failed: {0}")]
    HumanInput(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
