//! Config-list failover.
//!
//! [`LlmRouter`] holds one [`OpenAIClient`] per config list entry and tries them in
//! order. Network failures and retryable API errors move on to the next entry;
//! anything else is returned immediately.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cache::{ResponseCache, DEFAULT_CACHE_ROOT};
use crate::config::LlmConfig;
use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse};
use crate::{ChatModel, OpenAIClient};

pub struct LlmRouter {
    clients: Vec<OpenAIClient>,
    cache: Option<ResponseCache>,
    temperature: Option<f32>,
}

impl LlmRouter {
    /// Build a router caching under `.cache/<seed>` when the config has a seed.
    pub fn new(config: LlmConfig) -> Self {
        Self::with_cache_root(config, DEFAULT_CACHE_ROOT)
    }

    pub fn with_cache_root(config: LlmConfig, cache_root: impl AsRef<Path>) -> Self {
        let http_client = Client::new();
        let clients = config
            .config_list
            .into_iter()
            .map(|entry| OpenAIClient::with_http_client(http_client.clone(), entry))
            .collect::<Vec<_>>();

        let cache = config
            .cache_seed
            .map(|seed| ResponseCache::new(cache_root, seed));

        info!(
            endpoints = clients.len(),
            cache = ?cache.as_ref().map(|c| c.dir().display().to_string()),
            "LLM router ready"
        );

        Self {
            clients,
            cache,
            temperature: config.temperature,
        }
    }

    pub fn models(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.model()).collect()
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }
}

#[async_trait]
impl ChatModel for LlmRouter {
    async fn complete(&self, mut request: ChatRequest) -> Result<ChatResponse> {
        let first = self
            .clients
            .first()
            .ok_or_else(|| LlmError::Config("Config list is empty".into()))?;

        if request.temperature.is_none() {
            request.temperature = self.temperature;
        }

        // Keyed on the preferred model so a failover answer is reused next time.
        let cache_key = self
            .cache
            .as_ref()
            .map(|cache| cache.key(&request.to_body(first.model())));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(response) = cache.get(key).await {
                return Ok(response);
            }
        }

        let mut last_error = None;
        for (attempt, client) in self.clients.iter().enumerate() {
            let body = request.to_body(client.model());
            match client.chat_completion(&body).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(model = client.model(), attempt, "Served by fallback endpoint");
                    }
                    if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
                        cache.put(key, &response).await;
                    }
                    return Ok(response);
                }
                Err(e) if e.should_fail_over() => {
                    warn!(model = client.model(), error = %e, "Endpoint failed, trying next");
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(model = client.model(), error = %e, "Endpoint returned a final error");
                    return Err(e);
                }
            }
        }

        Err(LlmError::Exhausted {
            attempts: self.clients.len(),
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
