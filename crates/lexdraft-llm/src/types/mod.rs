pub mod assistant;
pub mod message;

pub use assistant::{
    AssistantThread, MessageContent, MessagePage, MessageRole, Run, RunError, RunStatus,
    TextContent, ThreadMessage,
};
pub use message::Message;
