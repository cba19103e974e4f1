use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::chat::ChatType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssistantResponseType {
    /// Plain text bubble
    Text,
    /// Suggested answers rendered as buttons
    QuickReplies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssistantResponsePayload {
    #[serde(rename = "type")]
    pub response_type: AssistantResponseType,
    pub messages: Vec<String>,
}

impl AssistantResponsePayload {
    pub fn text(messages: Vec<String>) -> Self {
        Self {
            response_type: AssistantResponseType::Text,
            messages,
        }
    }

    pub fn quick_replies(messages: Vec<String>) -> Self {
        Self {
            response_type: AssistantResponseType::QuickReplies,
            messages,
        }
    }
}

/// Structured model output. Stored in `chat.content` as the JSON of `responses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssistantResponse {
    pub responses: Vec<AssistantResponsePayload>,
}

impl AssistantResponse {
    /// First TEXT message, used as a conversation preview
    pub fn first_text(&self) -> Option<&str> {
        self.responses
            .iter()
            .filter(|p| p.response_type == AssistantResponseType::Text)
            .flat_map(|p| p.messages.iter())
            .map(String::as_str)
            .next()
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct AssistantRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartChatResponse {
    pub conversation_id: Uuid,
    pub messages: Vec<AssistantResponsePayload>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    pub chat: Vec<AssistantResponsePayload>,
    pub chat_type: ChatType,
}

/// One stored message as returned by the message history endpoint
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub chat_id: i64,
    pub conversation_id: Uuid,
    pub chat_type: ChatType,
    pub chat: Vec<AssistantResponsePayload>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let response = AssistantResponse {
            responses: vec![
                AssistantResponsePayload::text(vec!["안녕하세요!".to_string()]),
                AssistantResponsePayload::quick_replies(vec!["다이어트".to_string()]),
            ],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["responses"][0]["type"], "TEXT");
        assert_eq!(value["responses"][1]["type"], "QUICK_REPLIES");
        assert_eq!(value["responses"][1]["messages"][0], "다이어트");
        assert_eq!(response.first_text(), Some("안녕하세요!"));
    }

    #[test]
    fn test_first_text_skips_quick_replies() {
        let response = AssistantResponse {
            responses: vec![AssistantResponsePayload::quick_replies(vec!["a".to_string()])],
        };
        assert_eq!(response.first_text(), None);
    }
}
