use std::sync::Arc;

use lexdraft_llm::{LLMClient, ListMessagesQuery, MessageRole, RunRequest};

use crate::builder::ConversationBuilder;
use crate::complaint::ComplaintGenerator;
use crate::error::{ConversationError, Result};
use crate::models::ChatMessage;
use crate::poller::{PollOutcome, RunPoller};
use crate::session::Session;
use crate::templates::{
    run_failed_message, NO_REPLY_MESSAGE, RUN_BUSY_MESSAGE, RUN_TIMEOUT_MESSAGE,
};
use crate::threads::ThreadManager;

/// How an exchange with the assistant ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed,
    /// Run ended in a failure state; the text is an apology
    Failed,
    /// Gave up waiting; the run is still recorded as in flight
    TimedOut,
    /// A previous run on the thread is still going; nothing was submitted
    Busy,
    /// Run completed but the newest message was empty or echoed the question
    NoReply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub thread_id: String,
    pub text: String,
    pub outcome: ReplyOutcome,
}

/// Drives one user session against the remote assistant
pub struct Conversation {
    client: Arc<dyn LLMClient>,
    assistant_id: String,
    run_instructions: String,
    poller: RunPoller,
    threads: ThreadManager,
}

impl Conversation {
    pub fn builder() -> ConversationBuilder {
        ConversationBuilder::new()
    }

    pub(crate) fn new(
        client: Arc<dyn LLMClient>,
        assistant_id: String,
        run_instructions: String,
        poller: RunPoller,
        threads: ThreadManager,
    ) -> Self {
        Self {
            client,
            assistant_id,
            run_instructions,
            poller,
            threads,
        }
    }

    pub fn threads(&self) -> &ThreadManager {
        &self.threads
    }

    pub fn complaints(&self) -> ComplaintGenerator<'_> {
        ComplaintGenerator::new(self)
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn poller(&self) -> &RunPoller {
        &self.poller
    }

    /// Send `user_text` on the session's active thread (creating one if needed)
    /// and record the exchange in the transcript.
    pub async fn submit(&self, session: &mut Session, user_text: &str) -> Result<Reply> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        session.begin_processing(user_text);
        let result = self.submit_inner(session, user_text).await;
        session.finish_processing();
        result
    }

    async fn submit_inner(&self, session: &mut Session, user_text: &str) -> Result<Reply> {
        let thread_id = match session.active_thread_id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.threads.create_thread(session, user_text).await?;
                session.set_active_thread(id.clone());
                id
            }
        };

        let (mut text, mut outcome) = self.exchange(session, &thread_id, user_text).await?;

        if outcome != ReplyOutcome::Busy {
            session.push_message(ChatMessage::user(user_text));
            if is_recordable(&text, user_text) {
                session.push_message(ChatMessage::assistant(text.clone()));
            } else {
                tracing::debug!(thread_id = %thread_id, "Skipped empty or echoed reply");
                text = NO_REPLY_MESSAGE.to_string();
                outcome = ReplyOutcome::NoReply;
            }
        }

        Ok(Reply {
            thread_id,
            text,
            outcome,
        })
    }

    /// Drain any earlier run on the thread, post `user_text`, run the assistant
    /// and wait for its answer. Does not touch the transcript.
    pub(crate) async fn exchange(
        &self,
        session: &mut Session,
        thread_id: &str,
        user_text: &str,
    ) -> Result<(String, ReplyOutcome)> {
        if let Some(previous) = session.in_flight_run(thread_id).map(str::to_string) {
            tracing::info!(thread_id, run_id = %previous, "Waiting for previous run before submitting");
            match self.poller.wait(self.client.as_ref(), thread_id, &previous).await? {
                PollOutcome::TimedOut { .. } => {
                    return Ok((RUN_BUSY_MESSAGE.to_string(), ReplyOutcome::Busy));
                }
                _ => session.clear_in_flight(thread_id),
            }
        }

        self.client
            .create_message(thread_id, MessageRole::User, user_text)
            .await?;

        let run = self
            .client
            .create_run(
                thread_id,
                RunRequest::new(self.assistant_id.clone()).instructions(self.run_instructions.clone()),
            )
            .await?;
        session.record_in_flight(thread_id, &run.id);

        match self.poller.wait(self.client.as_ref(), thread_id, &run.id).await? {
            PollOutcome::Completed(_) => {
                session.clear_in_flight(thread_id);
                let text = self.latest_reply(thread_id).await?;
                Ok((text, ReplyOutcome::Completed))
            }
            PollOutcome::Failed(run) => {
                session.clear_in_flight(thread_id);
                let detail = run.last_error.as_ref().map(|e| e.message.as_str());
                Ok((run_failed_message(detail), ReplyOutcome::Failed))
            }
            PollOutcome::TimedOut { .. } => {
                Ok((RUN_TIMEOUT_MESSAGE.to_string(), ReplyOutcome::TimedOut))
            }
        }
    }

    /// Text of the newest message on the thread
    async fn latest_reply(&self, thread_id: &str) -> Result<String> {
        let page = self
            .client
            .list_messages(thread_id, ListMessagesQuery::new().limit(1))
            .await?;

        Ok(page
            .data
            .first()
            .and_then(|m| m.first_text())
            .unwrap_or_default()
            .to_string())
    }
}

/// Empty replies and replies that merely repeat the question are not recorded
fn is_recordable(reply: &str, user_text: &str) -> bool {
    let reply = reply.trim();
    !reply.is_empty() && reply != user_text.trim()
}
