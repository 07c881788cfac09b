// Configuration layer for creating LLM clients from settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::{OpenAIClient, OPENAI_API_BASE};
use crate::traits::LLMClient;

/// Configuration for OpenAI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL for OpenAI API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_API_BASE)
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a client that serves both chat completions and the assistant API
    pub fn create_client(config: OpenAIConfig) -> Result<Arc<dyn LLMClient>> {
        let client = OpenAIClient::new(config.api_key)?
            .with_base_url(config.base_url.as_deref().unwrap_or(OPENAI_API_BASE));
        Ok(Arc::new(client))
    }
}
