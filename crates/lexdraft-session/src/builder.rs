use std::sync::Arc;

use lexdraft_llm::LLMClient;

use crate::conversation::Conversation;
use crate::error::{ConversationError, Result};
use crate::poller::{PollPolicy, RunPoller};
use crate::templates::DEFAULT_RUN_INSTRUCTIONS;
use crate::threads::{ThreadManager, TitleSettings};

pub struct ConversationBuilder {
    client: Option<Arc<dyn LLMClient>>,
    assistant_id: Option<String>,
    run_instructions: String,
    poll_policy: PollPolicy,
    title: TitleSettings,
}

impl ConversationBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            assistant_id: None,
            run_instructions: DEFAULT_RUN_INSTRUCTIONS.to_string(),
            poll_policy: PollPolicy::default(),
            title: TitleSettings::default(),
        }
    }

    pub fn client(mut self, client: Arc<dyn LLMClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.assistant_id = Some(id.into());
        self
    }

    pub fn run_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.run_instructions = instructions.into();
        self
    }

    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn title_model(mut self, model: impl Into<String>) -> Self {
        self.title.model = model.into();
        self
    }

    pub fn title_max_tokens(mut self, max_tokens: u32) -> Self {
        self.title.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> Result<Conversation> {
        let client = self
            .client
            .ok_or_else(|| ConversationError::Client(anyhow::anyhow!("client is required")))?;
        let assistant_id = self
            .assistant_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConversationError::Client(anyhow::anyhow!("assistant_id is required")))?;

        let threads = ThreadManager::new(client.clone(), self.title);

        Ok(Conversation::new(
            client,
            assistant_id,
            self.run_instructions,
            RunPoller::new(self.poll_policy),
            threads,
        ))
    }
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
