//! OpenAI-compatible chat completion client
//!
//! Chat completions with function calling against any endpoint that speaks the
//! OpenAI `/chat/completions` protocol, plus config-list failover and an on-disk
//! response cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{config_list_from_json, ChatModel, ChatRequest, LlmConfig, LlmRouter, Message};
//!
//! let entries = config_list_from_json("OAI_CONFIG_LIST", &["gpt-4o"])?;
//! let router = LlmRouter::new(LlmConfig::new(entries));
//!
//! let response = router
//!     .complete(ChatRequest::new().message(Message::user("Hello!")))
//!     .await?;
//! ```
//!
//! # Tools
//!
//! ```rust,ignore
//! let request = ChatRequest::new()
//!     .message(Message::system("You are a risk analyst"))
//!     .message(Message::user("Scan internal data"))
//!     .tools(vec![ScanInternalData.definition()]);
//!
//! let response = router.complete(request).await?;
//! for call in &response.message.tool_calls {
//!     println!("{} {}", call.name(), call.arguments());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod router;
pub mod schema;
pub mod testing;
pub mod tool;
pub mod types;

pub use cache::ResponseCache;
pub use config::{
    config_list_from_json, filter_config_list, parse_config_list, LlmConfig, LlmConfigEntry,
};
pub use error::{LlmError, Result};
pub use router::LlmRouter;
pub use schema::ParameterSchema;
pub use tool::{ErasedTool, Tool, ToolDefinition, ToolError};
pub use types::*;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

/// Anything that can answer a chat completion request.
///
/// Implemented by [`LlmRouter`] for real endpoints and by
/// [`testing::ScriptedChatModel`] for tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Client for a single OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    entry: LlmConfigEntry,
}

impl OpenAIClient {
    /// Create a client for one config list entry.
    pub fn new(entry: LlmConfigEntry) -> Self {
        Self::with_http_client(Client::new(), entry)
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http_client(http_client: Client, entry: LlmConfigEntry) -> Self {
        Self { http_client, entry }
    }

    /// The model served by this endpoint.
    pub fn model(&self) -> &str {
        &self.entry.model
    }

    pub fn entry(&self) -> &LlmConfigEntry {
        &self.entry
    }

    /// Full URL for the chat completions call.
    pub fn completions_url(&self) -> String {
        if self.entry.is_azure() {
            let api_version = self.entry.api_version.as_deref().unwrap_or("2024-02-01");
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.entry.base_url(),
                self.entry.model,
                api_version
            )
        } else {
            format!("{}/chat/completions", self.entry.base_url())
        }
    }

    /// Chat completion.
    ///
    /// Sends a prepared request body and returns the first choice.
    pub async fn chat_completion(&self, body: &serde_json::Value) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let mut request = self
            .http_client
            .post(self.completions_url())
            .header("Content-Type", "application/json");
        request = if self.entry.is_azure() {
            request.header("api-key", &self.entry.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.entry.api_key))
        };

        let response = request.json(body).send().await.map_err(|e| {
            warn!(model = %self.entry.model, error = %e, "Chat completion request failed");
            LlmError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                model = %self.entry.model,
                status = %status,
                retry_after_secs = ?retry_after,
                error = %error_text,
                "Chat completion API error"
            );
            return Err(map_http_error(status, error_text));
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let message = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::Parse("Response contained no choices".into()))?;

        debug!(
            model = %self.entry.model,
            duration_ms = start.elapsed().as_millis(),
            tool_calls = message.tool_calls.len(),
            "Chat completion"
        );

        Ok(ChatResponse {
            message,
            usage: raw.usage,
        })
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Rate limits and server-side failures are worth trying elsewhere.
fn map_http_error(status: StatusCode, body: String) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    LlmError::Api {
        status: status.as_u16(),
        message,
        retryable,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<u64> {
    header?.to_str().ok()?.parse::<u64>().ok()
}
