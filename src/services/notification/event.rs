use std::collections::BTreeMap;

use uuid::Uuid;

use crate::models::notification::NotificationType;
use crate::schemas::notification::CreateNotification;

/// Domain events that end up as a persisted notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// The daily or on-demand AI feedback for a goal is ready
    Feedback {
        goal_title: String,
        conversation_id: Uuid,
        receiver_id: Uuid,
    },
}

impl NotificationEvent {
    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationEvent::Feedback { .. } => NotificationType::AssistantFeedback,
        }
    }

    pub fn title(&self) -> String {
        match self {
            NotificationEvent::Feedback { .. } => "AI 비서 알림".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            NotificationEvent::Feedback { goal_title, .. } => {
                format!("\"{}\" 목표에 대한 피드백을 확인하세요.", goal_title)
            }
        }
    }

    pub fn metadata(&self) -> BTreeMap<String, String> {
        match self {
            NotificationEvent::Feedback {
                goal_title,
                conversation_id,
                receiver_id,
            } => BTreeMap::from([
                ("goalTitle".to_string(), goal_title.clone()),
                ("conversationId".to_string(), conversation_id.to_string()),
                ("receiverId".to_string(), receiver_id.to_string()),
            ]),
        }
    }

    pub fn receiver_id(&self) -> Uuid {
        match self {
            NotificationEvent::Feedback { receiver_id, .. } => *receiver_id,
        }
    }
}

impl From<&NotificationEvent> for CreateNotification {
    fn from(event: &NotificationEvent) -> Self {
        Self {
            notification_type: event.notification_type(),
            title: event.title(),
            description: event.description(),
            metadata: event.metadata(),
            receiver_id: event.receiver_id(),
        }
    }
}
