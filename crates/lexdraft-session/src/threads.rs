use std::sync::Arc;

use chrono::Utc;
use lexdraft_llm::{ChatOptions, ChatRequest, LLMClient, ListMessagesQuery, Message};

use crate::error::Result;
use crate::models::{ChatMessage, ThreadSummary};
use crate::session::Session;
use crate::templates::{TITLE_MAX_CHARS, TITLE_SYSTEM_PROMPT};

pub const DEFAULT_TITLE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TITLE_MAX_TOKENS: u32 = 30;

const HISTORY_PAGE_SIZE: u32 = 100;

/// Settings for the summarization call that names new threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for TitleSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_TITLE_MODEL.to_string(),
            max_tokens: DEFAULT_TITLE_MAX_TOKENS,
        }
    }
}

/// Creates, names, lists and switches between threads
pub struct ThreadManager {
    client: Arc<dyn LLMClient>,
    title: TitleSettings,
}

impl ThreadManager {
    pub fn new(client: Arc<dyn LLMClient>, title: TitleSettings) -> Self {
        Self { client, title }
    }

    /// Create a remote thread titled after `seed_text` and append it to the session's thread list.
    ///
    /// The new thread is not activated here.
    pub async fn create_thread(&self, session: &mut Session, seed_text: &str) -> Result<String> {
        let thread = self.client.create_thread().await?;
        let title = self.generate_title(seed_text).await;

        tracing::info!(thread_id = %thread.id, %title, "Created conversation thread");

        session.add_thread(ThreadSummary {
            id: thread.id.clone(),
            title,
            created_at: thread.created_at_utc(),
        });

        Ok(thread.id)
    }

    /// Derive a short title from the user's first question.
    ///
    /// Falls back to the truncated question when the summarization call fails or returns nothing.
    pub async fn generate_title(&self, seed_text: &str) -> String {
        let request = ChatRequest::new(
            self.title.model.clone(),
            vec![Message::system(TITLE_SYSTEM_PROMPT), Message::human(seed_text)],
        )
        .with_options(ChatOptions::new().max_tokens(self.title.max_tokens));

        match self.client.chat(request).await {
            Ok(response) => {
                let title = response.content.as_deref().map(str::trim).unwrap_or_default();
                if title.is_empty() {
                    tracing::warn!("Title generation returned no text, using the question instead");
                    fallback_title(seed_text)
                } else {
                    title.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("Title generation failed, using the question instead: {:#}", e);
                fallback_title(seed_text)
            }
        }
    }

    /// Known threads in creation order
    pub fn list_threads<'a>(&self, session: &'a Session) -> &'a [ThreadSummary] {
        session.threads()
    }

    /// Make `thread_id` active and reload its full history, oldest first.
    pub async fn switch(&self, session: &mut Session, thread_id: &str) -> Result<()> {
        let messages = self.load_history(thread_id).await?;

        if session.thread(thread_id).is_none() {
            session.add_thread(ThreadSummary {
                id: thread_id.to_string(),
                title: adopted_title(thread_id),
                created_at: Utc::now(),
            });
        }

        tracing::info!(thread_id, messages = messages.len(), "Switched thread");

        session.set_active_thread(thread_id);
        session.replace_messages(messages);
        Ok(())
    }

    /// Fetch every message on a thread; the service pages newest-first
    pub async fn load_history(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let mut remote = Vec::new();
        let mut query = ListMessagesQuery::new().limit(HISTORY_PAGE_SIZE);

        loop {
            let page = self.client.list_messages(thread_id, query.clone()).await?;
            let has_more = page.has_more;
            let cursor = page
                .last_id
                .clone()
                .or_else(|| page.data.last().map(|m| m.id.clone()));
            remote.extend(page.data);

            match cursor {
                Some(cursor) if has_more => query = query.after(cursor),
                _ => break,
            }
        }

        remote.reverse();
        Ok(remote.iter().filter_map(ChatMessage::from_remote).collect())
    }
}

/// First `TITLE_MAX_CHARS` characters of the question, whitespace collapsed
pub fn fallback_title(seed_text: &str) -> String {
    let collapsed = seed_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let title: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        "새 대화".to_string()
    } else {
        title
    }
}

fn adopted_title(thread_id: &str) -> String {
    let short: String = thread_id
        .trim_start_matches("thread_")
        .chars()
        .take(8)
        .collect();
    format!("Thread {}", short)
}
