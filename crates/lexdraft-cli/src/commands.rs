/// One line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a slash command
    Chat(String),
    NewConversation,
    Threads,
    /// 1-based index into the thread list, or a raw thread id
    Switch(String),
    History,
    Complaint,
    ShowComplaint,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Chat(line.to_string()));
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        let command = match name.as_str() {
            "new" => Command::NewConversation,
            "threads" | "list" => Command::Threads,
            "switch" | "open" if !arg.is_empty() => Command::Switch(arg.to_string()),
            "history" => Command::History,
            "complaint" => Command::Complaint,
            "show" => Command::ShowComplaint,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}

pub const HELP: &str = "\
명령어:
  /new              새 대화 시작
  /threads          대화 목록 보기
  /switch <번호|ID>  다른 대화로 전환
  /history          현재 대화 내용 다시 보기
  /complaint        지금까지의 대화로 소장 생성
  /show             생성된 소장 보기
  /reset            모든 내용 지우고 새로 시작
  /help             도움말
  /quit             종료
그 외 입력은 AI에게 메시지로 전달됩니다.";
