use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::notification::{self, NotificationType};

/// Input for persisting one notification
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub receiver_id: Uuid,
    pub checked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(model: notification::Model) -> Self {
        let metadata = serde_json::from_str(&model.metadata).unwrap_or_default();
        Self {
            id: model.id,
            notification_type: model.notification_type,
            title: model.title,
            description: model.description,
            metadata,
            receiver_id: model.receiver_id,
            checked: model.checked,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CheckAllResponse {
    pub checked: u64,
}
