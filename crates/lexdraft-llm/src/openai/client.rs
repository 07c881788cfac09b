// OpenAI-specific client implementation

use crate::traits::{
    AssistantClient, ChatClient, ChatOptions, ChatRequest, ChatResponse, ListMessagesQuery,
    RunRequest, TokenUsage,
};
use crate::types::{
    AssistantThread, Message, MessagePage, MessageRole, Run, ThreadMessage,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const ASSISTANTS_BETA_HEADER: &str = "openai-beta";
const ASSISTANTS_BETA_VALUE: &str = "assistants=v2";

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );
        headers.insert(
            HeaderName::from_static(ASSISTANTS_BETA_HEADER),
            HeaderValue::from_static(ASSISTANTS_BETA_VALUE),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, local gateways, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build chat completion request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<Value> {
        let openai_messages: Vec<Value> = messages
            .into_iter()
            .map(|msg| self.convert_message(msg))
            .collect::<Result<Vec<_>>>()?;

        let mut obj = serde_json::Map::new();
        obj.insert("model".to_string(), serde_json::json!(model));
        obj.insert("messages".to_string(), Value::Array(openai_messages));
        obj.insert("stream".to_string(), Value::Bool(false));

        // o1 and gpt-5 models use different parameter names
        let is_reasoning_model = model.starts_with("o1") || model.starts_with("gpt-5");

        if let Some(temp) = options.temperature {
            if !is_reasoning_model {
                obj.insert("temperature".to_string(), serde_json::json!(temp));
            }
        }
        if let Some(max_tokens) = options.max_tokens {
            let token_field = if is_reasoning_model {
                "max_completion_tokens"
            } else {
                "max_tokens"
            };
            obj.insert(token_field.to_string(), serde_json::json!(max_tokens));
        }

        Ok(Value::Object(obj))
    }

    /// Convert our Message type to OpenAI format
    fn convert_message(&self, message: Message) -> Result<Value> {
        serde_json::to_value(message).context("Failed to serialize chat message")
    }

    /// Send a request and decode the JSON body, turning non-2xx replies into errors
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", action))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}) during {}: {}", status, action, error_text);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", action))
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options)?;

        let raw: OpenAIChatResponse = self
            .send_json(
                self.http_client
                    .post(format!("{}/chat/completions", self.base_url))
                    .json(&payload),
                "chat completion",
            )
            .await?;

        // Convert to provider-agnostic response
        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            usage: raw.usage.as_ref().map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }
}

#[async_trait]
impl AssistantClient for OpenAIClient {
    async fn create_thread(&self) -> Result<AssistantThread> {
        let thread: AssistantThread = self
            .send_json(
                self.http_client
                    .post(format!("{}/threads", self.base_url))
                    .json(&serde_json::json!({})),
                "create thread",
            )
            .await?;

        tracing::debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage> {
        let payload = serde_json::json!({
            "role": role.as_str(),
            "content": content,
        });

        self.send_json(
            self.http_client
                .post(format!("{}/threads/{}/messages", self.base_url, thread_id))
                .json(&payload),
            "create message",
        )
        .await
    }

    async fn create_run(&self, thread_id: &str, request: RunRequest) -> Result<Run> {
        let mut payload = serde_json::json!({
            "assistant_id": request.assistant_id,
        });
        if let Some(instructions) = request.instructions {
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("instructions".to_string(), serde_json::json!(instructions));
            }
        }

        let run: Run = self
            .send_json(
                self.http_client
                    .post(format!("{}/threads/{}/runs", self.base_url, thread_id))
                    .json(&payload),
                "create run",
            )
            .await?;

        tracing::debug!(thread_id, run_id = %run.id, status = %run.status, "Started run");
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.send_json(
            self.http_client
                .get(format!("{}/threads/{}/runs/{}", self.base_url, thread_id, run_id)),
            "retrieve run",
        )
        .await
    }

    async fn list_messages(&self, thread_id: &str, query: ListMessagesQuery) -> Result<MessagePage> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", query.limit.to_string()),
            ("order", query.order.as_str().to_string()),
        ];
        if let Some(after) = query.after {
            params.push(("after", after));
        }

        self.send_json(
            self.http_client
                .get(format!("{}/threads/{}/messages", self.base_url, thread_id))
                .query(&params),
            "list messages",
        )
        .await
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES (for Chat Completions)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
