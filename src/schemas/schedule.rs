use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::goal::GoalStatus;
use crate::models::schedule::{self, ScheduleStatus};

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewSchedule {
    pub fn from_request(goal_id: Uuid, user_id: Uuid, request: CreateScheduleRequest) -> Self {
        Self {
            goal_id,
            user_id,
            title: request.title,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Combinable listing filters. Dates are inclusive calendar days.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ScheduleFilter {
    pub goal_id: Option<Uuid>,
    pub status: Option<ScheduleStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ScheduleStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<schedule::Model> for ScheduleResponse {
    fn from(schedule: schedule::Model) -> Self {
        Self {
            id: schedule.id,
            goal_id: schedule.goal_id,
            user_id: schedule.user_id,
            title: schedule.title,
            description: schedule.description,
            status: schedule.status,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
            deleted_at: schedule.deleted_at,
        }
    }
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthlyStatisticsQuery {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub goal_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyScheduleStatistics {
    /// Day of month (1-31)
    pub date: u32,
    pub total_count: u64,
    pub completed_count: u64,
    /// 0.0 - 1.0
    pub completion_rate: f64,
}

impl DailyScheduleStatistics {
    pub fn new(date: u32, total_count: u64, completed_count: u64) -> Self {
        let completion_rate = if total_count > 0 {
            completed_count as f64 / total_count as f64
        } else {
            0.0
        };
        Self {
            date,
            total_count,
            completed_count,
            completion_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyScheduleStatisticsResponse {
    pub year: i32,
    pub month: u32,
    pub daily_statistics: Vec<DailyScheduleStatistics>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailySummaryQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyScheduleResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ScheduleStatus,
}

impl From<schedule::Model> for DailyScheduleResponse {
    fn from(schedule: schedule::Model) -> Self {
        Self {
            id: schedule.id,
            title: schedule.title,
            description: schedule.description,
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            status: schedule.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalWithSchedules {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
    pub image_id: Option<Uuid>,
    pub image_path: Option<String>,
    pub schedules: Vec<DailyScheduleResponse>,
    pub daily_schedule_count: u64,
    pub completed_schedule_count: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    pub goals: Vec<DailyGoalWithSchedules>,
    pub total_schedule_count: u64,
    pub completed_schedule_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        assert_eq!(DailyScheduleStatistics::new(3, 4, 1).completion_rate, 0.25);
        assert_eq!(DailyScheduleStatistics::new(3, 0, 0).completion_rate, 0.0);
    }

    #[test]
    fn test_filter_parses_camel_case() {
        let filter: ScheduleFilter =
            serde_json::from_str(r#"{"status":"COMPLETED","startDate":"2025-01-01"}"#).unwrap();
        assert_eq!(filter.status, Some(ScheduleStatus::Completed));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(filter.goal_id.is_none());
    }
}
