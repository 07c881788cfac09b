// Plain-text rendering of session state for the terminal.

use lexdraft_session::{ChatMessage, ChatRole, Reply, ReplyOutcome, Session};

pub const TITLE: &str = "AI 소장 작성 도우미";

pub fn speaker(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "사용자",
        ChatRole::Assistant => "AI",
    }
}

pub fn message(message: &ChatMessage) -> String {
    format!("{}: {}", speaker(message.role), message.content)
}

pub fn transcript(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "(대화 내용이 없습니다)".to_string();
    }
    messages.iter().map(message).collect::<Vec<_>>().join("\n")
}

/// Sidebar: numbered thread titles, active one marked with `*`
pub fn thread_list(session: &Session) -> String {
    let threads = session.threads();
    if threads.is_empty() {
        return "대화 목록이 비어 있습니다.".to_string();
    }

    let active = session.active_thread_id();
    let mut out = String::from("대화 목록:");
    for (index, thread) in threads.iter().enumerate() {
        let marker = if Some(thread.id.as_str()) == active { '*' } else { ' ' };
        out.push_str(&format!("\n{} {}. {}", marker, index + 1, thread.title));
    }
    out
}

pub fn reply(reply: &Reply) -> String {
    match reply.outcome {
        ReplyOutcome::Completed | ReplyOutcome::Failed | ReplyOutcome::TimedOut => {
            format!("AI: {}", reply.text)
        }
        ReplyOutcome::NoReply => format!("({})", reply.text),
        ReplyOutcome::Busy => format!("AI: {} (메시지가 전송되지 않았습니다)", reply.text),
    }
}

pub fn complaint(session: &Session) -> String {
    match session.complaint() {
        Some(text) => format!("생성된 소장:\n{}", text),
        None => "아직 생성된 소장이 없습니다. /complaint 로 생성하세요.".to_string(),
    }
}

/// Resolve a `/switch` argument: 1-based list index first, then exact thread id
pub fn resolve_thread(session: &Session, target: &str) -> Option<String> {
    if let Ok(index) = target.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| session.threads().get(i))
            .map(|t| t.id.clone());
    }
    if target.starts_with("thread_") || session.thread(target).is_some() {
        return Some(target.to_string());
    }
    None
}
