use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Conversation list item
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    /// First TEXT message of the latest chat, empty when there is none
    pub recent_chat: String,
    pub recent_at: DateTime<Utc>,
    pub goal_id: Option<Uuid>,
    pub goal_title: Option<String>,
}
