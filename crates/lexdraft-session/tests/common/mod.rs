// In-memory stand-in for the assistant service, scripted per run.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lexdraft_llm::types::TextContent;
use lexdraft_llm::{
    AssistantClient, AssistantThread, ChatClient, ChatRequest, ChatResponse, LLMClient,
    ListMessagesQuery, MessageContent, MessagePage, MessageRole, Run, RunError, RunRequest,
    RunStatus, SortOrder, ThreadMessage,
};
use lexdraft_session::{Conversation, PollPolicy};

/// What a run does when polled
#[derive(Debug, Clone)]
pub struct RunScript {
    /// Statuses returned by successive polls; the last one repeats
    pub statuses: Vec<RunStatus>,
    /// Assistant message appended to the thread once the run completes
    pub reply: Option<String>,
    pub error: Option<String>,
}

impl RunScript {
    pub fn reply(text: &str) -> Self {
        Self {
            statuses: vec![RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed],
            reply: Some(text.to_string()),
            error: None,
        }
    }

    pub fn completes_without_reply() -> Self {
        Self {
            statuses: vec![RunStatus::Completed],
            reply: None,
            error: None,
        }
    }

    pub fn fails(message: &str) -> Self {
        Self {
            statuses: vec![RunStatus::InProgress, RunStatus::Failed],
            reply: None,
            error: Some(message.to_string()),
        }
    }

    pub fn stuck() -> Self {
        Self {
            statuses: vec![RunStatus::InProgress],
            reply: None,
            error: None,
        }
    }
}

struct FakeRun {
    id: String,
    thread_id: String,
    assistant_id: String,
    statuses: VecDeque<RunStatus>,
    current: RunStatus,
    reply: Option<String>,
    error: Option<String>,
    replied: bool,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    clock: i64,
    /// thread id -> messages, oldest first
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, FakeRun>,
    scripts: VecDeque<RunScript>,
    title: Option<Result<String, String>>,
    chat_requests: Vec<ChatRequest>,
    run_requests: Vec<RunRequest>,
    events: Vec<String>,
    overlapping_runs: u32,
    page_cap: Option<u32>,
    list_calls: u32,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn append(&mut self, thread_id: &str, role: MessageRole, text: &str, run_id: Option<String>) -> ThreadMessage {
        self.clock += 1;
        let message = ThreadMessage {
            id: self.next("msg"),
            thread_id: thread_id.to_string(),
            role,
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: text.to_string(),
                    annotations: Vec::new(),
                },
            }],
            created_at: self.clock,
            run_id,
            assistant_id: None,
        };
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }
}

#[derive(Clone, Default)]
pub struct FakeAssistant {
    state: Arc<Mutex<FakeState>>,
}

impl FakeAssistant {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.set_title("이웃 소음 민원 제기 방법");
        fake
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().unwrap().title = Some(Ok(title.to_string()));
    }

    pub fn fail_titles(&self) {
        self.state.lock().unwrap().title = Some(Err("title service down".to_string()));
    }

    pub fn push_script(&self, script: RunScript) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    /// Cap on messages per list page regardless of the requested limit
    pub fn set_page_cap(&self, cap: u32) {
        self.state.lock().unwrap().page_cap = Some(cap);
    }

    /// Let a stuck run finish with `reply` on its next poll
    pub fn finish_run(&self, run_id: &str, reply: &str) {
        let mut state = self.state.lock().unwrap();
        let run = state.runs.get_mut(run_id).expect("unknown run");
        run.statuses = VecDeque::from(vec![RunStatus::Completed]);
        run.reply = Some(reply.to_string());
    }

    /// Seed a thread with existing history (oldest first)
    pub fn seed_thread(&self, messages: &[(MessageRole, &str)]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next("thread");
        state.threads.insert(id.clone(), Vec::new());
        for (role, text) in messages {
            state.append(&id, *role, text, None);
        }
        id
    }

    pub fn delete_thread(&self, thread_id: &str) {
        self.state.lock().unwrap().threads.remove(thread_id);
    }

    pub fn remote_messages(&self, thread_id: &str) -> Vec<(MessageRole, String)> {
        let state = self.state.lock().unwrap();
        state
            .threads
            .get(thread_id)
            .map(|msgs| {
                msgs.iter()
                    .map(|m| (m.role, m.first_text().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn event_index(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub fn run_requests(&self) -> Vec<RunRequest> {
        self.state.lock().unwrap().run_requests.clone()
    }

    pub fn runs_started(&self) -> usize {
        self.state.lock().unwrap().run_requests.len()
    }

    pub fn threads_created(&self) -> usize {
        self.events().iter().filter(|e| e.starts_with("create_thread")).count()
    }

    /// Number of times a run was started while another run on the same thread was unfinished
    pub fn overlapping_runs(&self) -> u32 {
        self.state.lock().unwrap().overlapping_runs
    }

    pub fn list_calls(&self) -> u32 {
        self.state.lock().unwrap().list_calls
    }

    pub fn into_client(self) -> Arc<dyn LLMClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl ChatClient for FakeAssistant {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut state = self.state.lock().unwrap();
        state.chat_requests.push(request);
        match state.title.clone() {
            Some(Ok(title)) => Ok(ChatResponse {
                content: Some(format!("  {}\n", title)),
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: serde_json::Value::Null,
            }),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Ok(ChatResponse {
                content: None,
                usage: None,
                finish_reason: Some("stop".to_string()),
                raw: serde_json::Value::Null,
            }),
        }
    }
}

#[async_trait]
impl AssistantClient for FakeAssistant {
    async fn create_thread(&self) -> Result<AssistantThread> {
        let mut state = self.state.lock().unwrap();
        let id = state.next("thread");
        state.threads.insert(id.clone(), Vec::new());
        state.events.push(format!("create_thread {}", id));
        Ok(AssistantThread {
            id,
            created_at: 1_700_000_000,
        })
    }

    async fn create_message(&self, thread_id: &str, role: MessageRole, content: &str) -> Result<ThreadMessage> {
        let mut state = self.state.lock().unwrap();
        if !state.threads.contains_key(thread_id) {
            return Err(anyhow!("No thread found with id '{}'", thread_id));
        }
        state.events.push(format!("create_message {}", thread_id));
        Ok(state.append(thread_id, role, content, None))
    }

    async fn create_run(&self, thread_id: &str, request: RunRequest) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        let overlapping = state
            .runs
            .values()
            .any(|r| r.thread_id == thread_id && !r.current.is_terminal());
        if overlapping {
            state.overlapping_runs += 1;
        }

        let script = state
            .scripts
            .pop_front()
            .unwrap_or_else(|| RunScript::reply("기본 답변입니다."));
        let id = state.next("run");
        state.events.push(format!("create_run {}", id));
        state.run_requests.push(request.clone());
        state.runs.insert(
            id.clone(),
            FakeRun {
                id: id.clone(),
                thread_id: thread_id.to_string(),
                assistant_id: request.assistant_id.clone(),
                statuses: script.statuses.into(),
                current: RunStatus::Queued,
                reply: script.reply,
                error: script.error,
                replied: false,
            },
        );

        Ok(Run {
            id,
            thread_id: thread_id.to_string(),
            assistant_id: request.assistant_id,
            status: RunStatus::Queued,
            created_at: 1_700_000_000,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        let (status, reply, error, assistant_id) = {
            let run = state
                .runs
                .get_mut(run_id)
                .ok_or_else(|| anyhow!("No run found with id '{}'", run_id))?;
            if run.statuses.len() > 1 {
                run.current = run.statuses.pop_front().unwrap_or(run.current);
            } else if let Some(last) = run.statuses.front() {
                run.current = *last;
            }
            let reply = if run.current == RunStatus::Completed && !run.replied {
                run.replied = true;
                run.reply.clone()
            } else {
                None
            };
            (run.current, reply, run.error.clone(), run.assistant_id.clone())
        };

        if let Some(reply) = reply {
            state.append(thread_id, MessageRole::Assistant, &reply, Some(run_id.to_string()));
        }
        state.events.push(format!("retrieve_run {} {}", run_id, status));

        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            assistant_id,
            status,
            created_at: 1_700_000_000,
            last_error: if status == RunStatus::Failed {
                error.map(|message| RunError {
                    code: "server_error".to_string(),
                    message,
                })
            } else {
                None
            },
        })
    }

    async fn list_messages(&self, thread_id: &str, query: ListMessagesQuery) -> Result<MessagePage> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        let mut messages = state
            .threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| anyhow!("No thread found with id '{}'", thread_id))?;
        if query.order == SortOrder::Desc {
            messages.reverse();
        }

        let start = match &query.after {
            Some(cursor) => messages
                .iter()
                .position(|m| &m.id == cursor)
                .map(|i| i + 1)
                .unwrap_or(messages.len()),
            None => 0,
        };
        let limit = state.page_cap.map_or(query.limit, |cap| cap.min(query.limit)) as usize;
        let data: Vec<ThreadMessage> = messages.iter().skip(start).take(limit).cloned().collect();
        let has_more = start + data.len() < messages.len();

        Ok(MessagePage {
            first_id: data.first().map(|m| m.id.clone()),
            last_id: data.last().map(|m| m.id.clone()),
            has_more,
            data,
        })
    }
}

/// Fast polling so timeouts trigger in milliseconds
pub fn fast_policy() -> PollPolicy {
    PollPolicy::fixed(Duration::from_millis(1), Duration::from_millis(40))
}

pub fn conversation(fake: &FakeAssistant) -> Conversation {
    Conversation::builder()
        .client(fake.clone().into_client())
        .assistant_id("asst_test")
        .poll_policy(fast_policy())
        .build()
        .unwrap()
}
