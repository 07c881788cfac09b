pub mod builder;
pub mod complaint;
pub mod conversation;
pub mod error;
pub mod models;
pub mod poller;
pub mod session;
pub mod store;
pub mod templates;
pub mod threads;

pub use builder::ConversationBuilder;
pub use complaint::ComplaintGenerator;
pub use conversation::{Conversation, Reply, ReplyOutcome};
pub use error::{ConversationError, Result};
pub use models::{ChatMessage, ChatRole, ThreadSummary};
pub use poller::{PollOutcome, PollPolicy, RunPhase, RunPoller};
pub use session::Session;
pub use store::{SessionStore, SharedSession};
pub use threads::{ThreadManager, TitleSettings};
