// Fixed prompts and user-facing strings.

/// Instructions attached to every run
pub const DEFAULT_RUN_INSTRUCTIONS: &str = "Please provide a response.";

/// System prompt for thread title generation
pub const TITLE_SYSTEM_PROMPT: &str =
    "사용자의 질문을 바탕으로 20자 내외의 간결한 대화 제목을 만들어 주세요. 제목만 출력하세요.";

/// Fixed user text sent when a complaint is requested
pub const COMPLAINT_REQUEST: &str = "지금까지의 정보를 바탕으로 소장을 작성해주세요.";

pub const RUN_FAILED_MESSAGE: &str =
    "죄송합니다. 응답을 생성하는 중 오류가 발생했습니다. 다시 시도해 주세요.";

pub const RUN_TIMEOUT_MESSAGE: &str =
    "응답 시간이 초과되었습니다. 잠시 후 다시 시도해 주세요.";

pub const NO_REPLY_MESSAGE: &str =
    "AI가 이번 메시지에 대한 답변을 남기지 않았습니다. 질문을 조금 바꿔 다시 입력해 주세요.";

pub const RUN_BUSY_MESSAGE: &str =
    "이전 요청을 아직 처리하고 있습니다. 잠시 후 다시 시도해 주세요.";

/// Maximum title length, in characters
pub const TITLE_MAX_CHARS: usize = 20;

pub fn run_failed_message(detail: Option<&str>) -> String {
    match detail.map(str::trim).filter(|d| !d.is_empty()) {
        Some(detail) => format!("{} (오류: {})", RUN_FAILED_MESSAGE, detail),
        None => RUN_FAILED_MESSAGE.to_string(),
    }
}
