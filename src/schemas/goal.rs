use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::goal::{self, GoalStatus};

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub image_id: Option<Uuid>,
    pub status: Option<GoalStatus>,
}

/// Service-level input, also used by the AI `save_goal` tool
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub image_id: Option<Uuid>,
    pub is_ai_generated: bool,
    pub status: GoalStatus,
}

impl NewGoal {
    pub fn from_request(user_id: Uuid, request: CreateGoalRequest) -> Self {
        Self {
            user_id,
            title: request.title,
            description: request.description,
            target_date: request.target_date,
            image_id: request.image_id,
            is_ai_generated: false,
            status: request.status.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub image_id: Option<Uuid>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoalStatusQuery {
    /// Defaults to ACTIVE
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: NaiveDate,
    pub is_ai_generated: bool,
    pub status: GoalStatus,
    pub image_path: Option<String>,
    pub total_schedule_count: u64,
    pub completed_schedule_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GoalResponse {
    pub fn from_model(
        goal: goal::Model,
        image_path: Option<String>,
        total_schedule_count: u64,
        completed_schedule_count: u64,
    ) -> Self {
        Self {
            id: goal.id,
            user_id: goal.user_id,
            title: goal.title,
            description: goal.description,
            target_date: goal.target_date,
            is_ai_generated: goal.is_ai_generated,
            status: goal.status,
            image_path,
            total_schedule_count,
            completed_schedule_count,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
            deleted_at: goal.deleted_at,
        }
    }
}
