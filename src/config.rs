use std::env;
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_PATH: &str = "lesson_plan_logs.csv";
const DEFAULT_MAX_RETRIES: u32 = 1;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Completion-service settings, read once at startup and handed to the
/// client explicitly. Nothing reads the environment after this.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// Total attempts for one completion request. 1 means a single call
    /// with no retry, which is the default.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub bind_addr: String,
    pub log_path: PathBuf,
}

impl AppConfig {
    /// Read all settings from the process environment. Called exactly once,
    /// before the server binds; a missing credential fails here rather than
    /// at request time, and before any network use.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let api_key = lookup("LLM_API_KEY").ok_or_else(|| {
            AppError::Configuration("LLM_API_KEY environment variable not set".into())
        })?;

        let llm = LlmConfig {
            api_key,
            api_url: lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_delay_ms: parse_or(&lookup, "LLM_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?,
            timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        };

        Ok(Self {
            llm,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_path: lookup("LOG_PATH").map_or_else(|| PathBuf::from(DEFAULT_LOG_PATH), PathBuf::from),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Configuration(format!("{key} must be an integer, got '{raw}'"))),
        None => Ok(default),
    }
}
