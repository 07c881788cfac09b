use crate::conversation::{Conversation, ReplyOutcome};
use crate::error::{ConversationError, Result};
use crate::session::Session;
use crate::templates::COMPLAINT_REQUEST;

/// Asks the assistant to compose a complaint from the active thread.
///
/// The answer is kept in the session's complaint slot, never in the transcript.
pub struct ComplaintGenerator<'a> {
    conversation: &'a Conversation,
}

impl<'a> ComplaintGenerator<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        Self { conversation }
    }

    /// Generate a complaint for the active thread, overwriting any stored one.
    pub async fn generate(&self, session: &mut Session) -> Result<String> {
        let thread_id = session
            .active_thread_id()
            .map(str::to_string)
            .ok_or(ConversationError::NoActiveThread)?;

        session.begin_processing(COMPLAINT_REQUEST);
        let result = self
            .conversation
            .exchange(session, &thread_id, COMPLAINT_REQUEST)
            .await;
        session.finish_processing();
        let (text, outcome) = result?;

        tracing::info!(thread_id = %thread_id, ?outcome, chars = text.chars().count(), "Complaint request finished");

        if outcome != ReplyOutcome::Busy {
            session.set_complaint(text.clone());
        }
        Ok(text)
    }
}
