//! Chat-completions client for an OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::assistant::AssistantConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON string
    pub arguments: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatCompletion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
        }
    }

    /// Echo of this completion as an `assistant` message for the next round
    pub fn to_message(&self) -> Value {
        let mut message = json!({
            "role": "assistant",
            "content": self.content,
        });
        if !self.tool_calls.is_empty() {
            message["tool_calls"] = self
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {"name": tc.name, "arguments": tc.arguments},
                    })
                })
                .collect();
        }
        message
    }
}

/// Sends messages and tool definitions to a language model
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: &[Value], tools: &[Value]) -> anyhow::Result<ChatCompletion>;
}

pub struct OpenAiChatModel {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(config: &AssistantConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        if config.api_key.is_empty() {
            tracing::warn!("AIMINDER_OPENAI_API_KEY not set, assistant requests will fail");
        }

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn chat(&self, messages: &[Value], tools: &[Value]) -> anyhow::Result<ChatCompletion> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "response_format": {"type": "json_object"},
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %self.model, tools = tools.len(), "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("Chat completions returned {}: {}", status, truncate(&text, 500));
        }

        parse_completion(&serde_json::from_str(&text)?)
    }
}

pub(crate) fn parse_completion(data: &Value) -> anyhow::Result<ChatCompletion> {
    let message = data["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| anyhow::anyhow!("No choices in response"))?;

    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .map(|tc| ToolCall {
                    id: tc["id"].as_str().unwrap_or_default().to_string(),
                    name: tc["function"]["name"].as_str().unwrap_or_default().to_string(),
                    arguments: tc["function"]["arguments"]
                        .as_str()
                        .unwrap_or("{}")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ChatCompletion {
        content: message["content"].as_str().map(str::to_string),
        tool_calls,
    })
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_calls() {
        let data = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_today", "arguments": "{}"}
                    }]
                }
            }]
        });

        let completion = parse_completion(&data).unwrap();
        assert_eq!(completion.content, None);
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].name, "get_today");

        let echoed = completion.to_message();
        assert_eq!(echoed["tool_calls"][0]["function"]["name"], "get_today");
    }

    #[test]
    fn test_parse_rejects_empty_choices() {
        assert!(parse_completion(&json!({"choices": []})).is_err());
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("목표", 4), "목");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
