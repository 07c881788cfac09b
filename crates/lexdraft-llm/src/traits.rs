use crate::types::{AssistantThread, Message, MessagePage, MessageRole, Run, ThreadMessage};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for stateless chat completions
///
/// Used for short one-shot calls (e.g. deriving a thread title).
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Trait for the stateful assistant API (threads, messages, runs)
///
/// The remote service owns thread and run state; implementations only relay calls.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Create an empty conversation thread
    async fn create_thread(&self) -> Result<AssistantThread>;

    /// Append a message to a thread
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage>;

    /// Start a run of an assistant on a thread
    async fn create_run(&self, thread_id: &str, request: RunRequest) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// List one page of messages on a thread
    async fn list_messages(&self, thread_id: &str, query: ListMessagesQuery) -> Result<MessagePage>;
}

/// Convenience trait for clients that support both chat and assistants
pub trait LLMClient: ChatClient + AssistantClient {}

impl<T: ChatClient + AssistantClient> LLMClient for T {}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub assistant_id: String,
    pub instructions: Option<String>,
}

impl RunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            instructions: None,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Query for listing thread messages (newest-first unless told otherwise)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMessagesQuery {
    pub limit: u32,
    pub order: SortOrder,
    pub after: Option<String>,
}

impl Default for ListMessagesQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            order: SortOrder::Desc,
            after: None,
        }
    }
}

impl ListMessagesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }
}
