//! Turn-based multi-agent group chat
//!
//! A [`Coordinator`] holds a roster of participants and runs one conversation at a
//! time: it picks a speaker, appends that speaker's reply to the transcript, and
//! repeats until a human proxy sends the termination token.
//!
//! # Example
//!
//! ```rust,ignore
//! use group_chat::{AssistantAgent, ConsoleTranscript, Coordinator, TerminalInput, UserProxyAgent};
//!
//! let human = Arc::new(UserProxyAgent::new("Risk_Manager", Arc::new(TerminalInput)));
//! let scanner = Arc::new(AssistantAgent::new("Internal_Data_Scanner", model.clone()).tool(ScanInternalData));
//!
//! let coordinator = Coordinator::builder("Risk_Assessment_Manager")
//!     .policy("You orchestrate a risk assessment team...")
//!     .model(model)
//!     .agent(human)
//!     .agent(scanner)
//!     .observer(Box::new(ConsoleTranscript))
//!     .build()?;
//!
//! let outcome = coordinator.run("Risk_Manager", "Start the annual risk assessment").await?;
//! ```

pub mod agent;
pub mod coordinator;
pub mod error;
pub mod human;
pub mod message;
pub mod selection;
pub mod transcript;
pub mod user_proxy;

pub use agent::{AssistantAgent, ConversableAgent};
pub use coordinator::{Coordinator, CoordinatorBuilder, SessionOutcome, StopReason, DEFAULT_MAX_ROUND};
pub use error::{GroupChatError, Result};
pub use human::{HumanInput, ScriptedInput, TerminalInput};
pub use message::{pending_tool_calls, ChatMessage, ToolResult, TERMINATION_TOKEN};
pub use selection::{mentioned_agents, NextTurn, SpeakerSelection, SpeakerSelector};
pub use transcript::{format_message, ConsoleTranscript, TranscriptObserver};
pub use user_proxy::{HumanInputMode, UserProxyAgent};
