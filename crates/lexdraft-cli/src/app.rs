use std::io::Write;

use anyhow::Result;
use lexdraft_session::{Conversation, ConversationError, SharedSession};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::commands::{Command, HELP};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive terminal session: one user, one session
pub struct App {
    conversation: Conversation,
    session: SharedSession,
}

impl App {
    pub fn new(conversation: Conversation, session: SharedSession) -> Self {
        Self {
            conversation,
            session,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Read commands line by line until `/quit` or end of input
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: Write,
    {
        writeln!(out, "{}", render::TITLE)?;
        writeln!(out, "{}", HELP)?;

        let mut lines = BufReader::new(input).lines();
        loop {
            write!(out, "\n> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            if self.handle(command, out).await? == Flow::Quit {
                break;
            }
        }

        tracing::info!("Terminal session ended");
        Ok(())
    }

    pub async fn handle<W: Write>(&self, command: Command, out: &mut W) -> Result<Flow> {
        let mut session = self.session.lock().await;

        match command {
            Command::Chat(text) => {
                writeln!(out, "(응답을 기다리는 중...)")?;
                match self.conversation.submit(&mut session, &text).await {
                    Ok(reply) => writeln!(out, "{}", render::reply(&reply))?,
                    Err(e) => report(out, e)?,
                }
            }
            Command::NewConversation => {
                session.new_conversation();
                writeln!(out, "새 대화를 시작합니다. 질문을 입력하세요.")?;
            }
            Command::Threads => {
                writeln!(out, "{}", render::thread_list(&session))?;
            }
            Command::Switch(target) => match render::resolve_thread(&session, &target) {
                Some(thread_id) => {
                    match self.conversation.threads().switch(&mut session, &thread_id).await {
                        Ok(()) => {
                            let title = session
                                .thread(&thread_id)
                                .map(|t| t.title.clone())
                                .unwrap_or_default();
                            writeln!(out, "[{}]", title)?;
                            writeln!(out, "{}", render::transcript(session.messages()))?;
                        }
                        Err(e) => report(out, e)?,
                    }
                }
                None => writeln!(out, "'{}' 에 해당하는 대화를 찾을 수 없습니다.", target)?,
            },
            Command::History => {
                writeln!(out, "{}", render::transcript(session.messages()))?;
            }
            Command::Complaint => {
                writeln!(out, "소장을 작성 중입니다...")?;
                match self.conversation.complaints().generate(&mut session).await {
                    Ok(_) => writeln!(out, "{}", render::complaint(&session))?,
                    Err(e) => report(out, e)?,
                }
            }
            Command::ShowComplaint => {
                writeln!(out, "{}", render::complaint(&session))?;
            }
            Command::Reset => {
                session.reset();
                writeln!(out, "모든 내용을 지웠습니다. 새로운 소장 작성을 시작하세요.")?;
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown(input) => {
                writeln!(out, "알 수 없는 명령어입니다: {} (/help 참고)", input)?;
            }
        }

        Ok(Flow::Continue)
    }
}

/// Errors are shown as an assistant bubble; the session keeps going
fn report<W: Write>(out: &mut W, error: ConversationError) -> Result<()> {
    match error {
        ConversationError::NoActiveThread => {
            writeln!(out, "AI: 먼저 대화를 시작한 뒤 소장을 생성해 주세요.")?;
        }
        ConversationError::EmptyInput => {
            writeln!(out, "AI: 메시지를 입력해 주세요.")?;
        }
        ConversationError::Client(e) => {
            tracing::error!("Assistant request failed: {:#}", e);
            writeln!(out, "AI: 죄송합니다. 요청을 처리하지 못했습니다. ({})", e)?;
        }
    }
    Ok(())
}
