use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use lexdraft_llm::OpenAIConfig;
use lexdraft_session::templates::DEFAULT_RUN_INSTRUCTIONS;
use lexdraft_session::threads::{DEFAULT_TITLE_MAX_TOKENS, DEFAULT_TITLE_MODEL};
use lexdraft_session::PollPolicy;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub title: TitleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub assistant_id: String,
    #[serde(default)]
    pub openai_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
        }
    }
}

fn default_instructions() -> String {
    DEFAULT_RUN_INSTRUCTIONS.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_backoff")]
    pub backoff: f64,
    /// Cap for a growing interval; unset means the overall timeout
    #[serde(default)]
    pub max_interval_ms: Option<u64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff: default_backoff(),
            max_interval_ms: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollConfig {
    /// Polling is always bounded; a zero timeout is raised to one second
    pub fn to_policy(&self) -> PollPolicy {
        let timeout = Duration::from_secs(self.timeout_secs.max(1));
        let max_interval = self
            .max_interval_ms
            .map_or(timeout, Duration::from_millis);

        PollPolicy::fixed(Duration::from_millis(self.interval_ms.max(1)), timeout)
            .with_backoff(self.backoff, max_interval)
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_backoff() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleConfig {
    #[serde(default = "default_title_model")]
    pub model: String,
    #[serde(default = "default_title_max_tokens")]
    pub max_tokens: u32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            model: default_title_model(),
            max_tokens: default_title_max_tokens(),
        }
    }
}

fn default_title_model() -> String {
    DEFAULT_TITLE_MODEL.to_string()
}

fn default_title_max_tokens() -> u32 {
    DEFAULT_TITLE_MAX_TOKENS
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed with LEXDRAFT_ (e.g. LEXDRAFT_POLL__TIMEOUT_SECS)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("LEXDRAFT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.openai_api_key = required_env("OPENAI_API_KEY")?;
        cfg.assistant_id = required_env("ASSISTANT_ID")?;
        cfg.openai_base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(cfg)
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        let config = OpenAIConfig::new(self.openai_api_key.clone());
        match &self.openai_base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}
