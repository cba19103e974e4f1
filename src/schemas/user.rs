use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::models::user_notification_settings;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GetUserResponse {
    pub id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct WithdrawUserRequest {
    pub reason: Option<String>,
}

/// `HH:mm` wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[schema(value_type = String, example = "09:00")]
pub struct HourMinute(pub NaiveTime);

impl Serialize for HourMinute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.format(TIME_FORMAT).to_string())
    }
}

impl<'de> Deserialize<'de> for HourMinute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
            .map(HourMinute)
            .map_err(|_| serde::de::Error::custom(format!("expected HH:mm, got {:?}", raw)))
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsResponse {
    pub ai_feedback_enabled: bool,
    pub ai_feedback_notification_time: HourMinute,
    pub updated_at: DateTime<Utc>,
}

impl From<user_notification_settings::Model> for NotificationSettingsResponse {
    fn from(model: user_notification_settings::Model) -> Self {
        Self {
            ai_feedback_enabled: model.ai_feedback_enabled,
            ai_feedback_notification_time: HourMinute(model.ai_feedback_notification_time),
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationSettingsRequest {
    pub ai_feedback_enabled: Option<bool>,
    pub ai_feedback_notification_time: Option<HourMinute>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAiFeedbackEnabledRequest {
    pub ai_feedback_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAiFeedbackTimeRequest {
    pub ai_feedback_notification_time: HourMinute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_minute_format() {
        let t: HourMinute = serde_json::from_str("\"07:05\"").unwrap();
        assert_eq!(t.0, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
        assert!(serde_json::from_str::<HourMinute>("\"25:00\"").is_err());
        assert!(serde_json::from_str::<HourMinute>("\"9am\"").is_err());
    }
}
