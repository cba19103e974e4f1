use std::env;

use super::env_parse;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    /// Upper bound on model <-> tool round trips per request
    pub max_tool_rounds: usize,
    /// Number of stored chats replayed to the model as history
    pub history_size: u64,
    pub request_timeout_secs: u64,
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("AIMINDER_OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: env::var("AIMINDER_OPENAI_API_KEY").unwrap_or_default(),
            model: env::var("AIMINDER_OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_tool_rounds: env_parse("AIMINDER_ASSISTANT_MAX_TOOL_ROUNDS", 5),
            history_size: env_parse("AIMINDER_ASSISTANT_HISTORY_SIZE", 20),
            request_timeout_secs: env_parse("AIMINDER_ASSISTANT_TIMEOUT_SECS", 120),
        }
    }
}
