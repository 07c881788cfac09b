use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::session::Session;

pub type SharedSession = Arc<Mutex<Session>>;

/// Process-local mapping of session id to session state.
///
/// Each session sits behind its own mutex so a host serving several users
/// serializes operations per session without blocking the others.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a fresh id and register it
    pub async fn create(&self) -> (String, SharedSession) {
        let session = Session::new();
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));

        self.sessions.write().await.insert(id.clone(), shared.clone());
        tracing::debug!(session_id = %id, "Created session");

        (id, shared)
    }

    pub async fn get(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Fetch an existing session or register a new one under `session_id`
    pub async fn get_or_create(&self, session_id: &str) -> SharedSession {
        if let Some(existing) = self.get(session_id).await {
            return existing;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::with_id(session_id))))
            .clone()
    }

    /// Drop a session entirely; returns whether it existed
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
