use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("No active thread: start a conversation first")]
    NoActiveThread,

    #[error("Assistant service error: {0}")]
    Client(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ConversationError>;
