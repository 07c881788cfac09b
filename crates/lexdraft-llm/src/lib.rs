pub mod config;
pub mod openai;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, OpenAIConfig};
pub use openai::OpenAIClient;
pub use traits::{
    AssistantClient,
    ChatClient,
    LLMClient,
    ChatRequest, ChatResponse, ChatOptions,
    ListMessagesQuery, RunRequest, SortOrder,
    TokenUsage,
};
pub use types::{
    AssistantThread, Message, MessageContent, MessagePage, MessageRole, Run, RunError,
    RunStatus, ThreadMessage,
};
