use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{ChatMessage, ThreadSummary};

/// Per-user conversation context.
///
/// Every orchestrator operation takes `&mut Session`, so one session never runs
/// two operations at once. Nothing here survives a process restart.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    active_thread_id: Option<String>,
    messages: Vec<ChatMessage>,
    threads: Vec<ThreadSummary>,
    complaint: Option<String>,
    /// thread id -> run id of a run whose terminal state has not been observed yet
    in_flight_runs: HashMap<String, String>,
    pending_input: Option<String>,
    processing: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            active_thread_id: None,
            messages: Vec::new(),
            threads: Vec::new(),
            complaint: None,
            in_flight_runs: HashMap::new(),
            pending_input: None,
            processing: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn active_thread_id(&self) -> Option<&str> {
        self.active_thread_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn threads(&self) -> &[ThreadSummary] {
        &self.threads
    }

    pub fn thread(&self, thread_id: &str) -> Option<&ThreadSummary> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    pub fn complaint(&self) -> Option<&str> {
        self.complaint.as_deref()
    }

    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn in_flight_run(&self, thread_id: &str) -> Option<&str> {
        self.in_flight_runs.get(thread_id).map(String::as_str)
    }

    /// True when nothing has happened since creation or the last full reset
    pub fn is_empty(&self) -> bool {
        self.active_thread_id.is_none()
            && self.messages.is_empty()
            && self.threads.is_empty()
            && self.complaint.is_none()
            && self.in_flight_runs.is_empty()
            && self.pending_input.is_none()
            && !self.processing
    }

    pub(crate) fn set_active_thread(&mut self, thread_id: impl Into<String>) {
        self.active_thread_id = Some(thread_id.into());
    }

    pub(crate) fn replace_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub(crate) fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a thread to the end of the known-thread list
    pub(crate) fn add_thread(&mut self, summary: ThreadSummary) {
        self.threads.push(summary);
    }

    pub(crate) fn set_complaint(&mut self, text: impl Into<String>) {
        self.complaint = Some(text.into());
    }

    pub(crate) fn record_in_flight(&mut self, thread_id: &str, run_id: &str) {
        self.in_flight_runs
            .insert(thread_id.to_string(), run_id.to_string());
    }

    pub(crate) fn clear_in_flight(&mut self, thread_id: &str) {
        self.in_flight_runs.remove(thread_id);
    }

    pub(crate) fn begin_processing(&mut self, input: &str) {
        self.pending_input = Some(input.to_string());
        self.processing = true;
    }

    pub(crate) fn finish_processing(&mut self) {
        self.pending_input = None;
        self.processing = false;
    }

    /// Start a fresh conversation: forget the active thread and its transcript.
    ///
    /// Known threads, the stored complaint and in-flight run records survive so
    /// older threads can still be switched to and drained.
    pub fn new_conversation(&mut self) {
        self.active_thread_id = None;
        self.messages.clear();
        self.pending_input = None;
        self.processing = false;
    }

    /// Clear every key, returning the session to its pre-first-message state.
    pub fn reset(&mut self) {
        let id = std::mem::take(&mut self.id);
        *self = Self::with_id(id);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
