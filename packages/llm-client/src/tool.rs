//! Functions an agent exposes to the model.
//!
//! A [`Tool`] declares typed arguments; the parameter schema sent to the model is
//! derived from them, and the model's JSON arguments are parsed back into them
//! before [`Tool::call`] runs. Agents keep heterogeneous tools as
//! `Box<dyn ErasedTool>` and dispatch on [`ErasedTool::name`].
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct AppetiteArgs {
//!     /// Risk category, e.g. "Operational"
//!     category: String,
//! }
//!
//! struct LookupAppetite;
//!
//! #[async_trait]
//! impl Tool for LookupAppetite {
//!     const NAME: &'static str = "lookup_risk_appetite";
//!     type Args = AppetiteArgs;
//!     type Output = String;
//!     type Error = std::convert::Infallible;
//!
//!     fn description(&self) -> &str {
//!         "Look up the risk appetite for a category"
//!     }
//!
//!     async fn call(&self, args: AppetiteArgs) -> Result<String, Self::Error> {
//!         Ok(format!("{}: Mitigate", args.category))
//!     }
//! }
//! ```

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::ParameterSchema;
use crate::types::normalize_arguments;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name the model calls. Unique within a group chat.
    const NAME: &'static str;

    type Args: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn description(&self) -> &str;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: self.description().to_string(),
            parameters: Self::Args::parameters_schema(),
        }
    }
}

/// Name, description and parameter schema of one function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Entry for the `tools` array of a chat-completions request
    pub fn to_request_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": &self.name,
                "description": &self.description,
                "parameters": &self.parameters,
            }
        })
    }
}

/// Object-safe view of a [`Tool`]: raw JSON arguments in, JSON text out.
#[async_trait]
pub trait ErasedTool: Send + Sync {
    fn name(&self) -> &str;

    fn definition(&self) -> ToolDefinition;

    async fn call_erased(&self, arguments: &str) -> Result<String, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Function failed: {0}")]
    Failed(String),

    #[error("Could not encode result: {0}")]
    Encode(String),
}

#[async_trait]
impl<T: Tool> ErasedTool for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_erased(&self, arguments: &str) -> Result<String, ToolError> {
        let args = serde_json::from_str::<T::Args>(normalize_arguments(arguments))
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        match self.call(args).await {
            Ok(output) => serde_json::to_string(&output).map_err(|e| ToolError::Encode(e.to_string())),
            Err(e) => Err(ToolError::Failed(e.to_string())),
        }
    }
}
