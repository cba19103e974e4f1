use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{GoalError, Result};
use crate::models::goal::{self, GoalStatus};
use crate::models::prelude::*;
use crate::models::schedule::{self, ScheduleStatus};
use crate::schemas::common::{Page, PageableRequest};
use crate::schemas::goal::{GoalResponse, NewGoal, UpdateGoalRequest};
use crate::services::image::ImageService;
use crate::state::DbConn;

#[derive(Clone)]
pub struct GoalService {
    db: DbConn,
    images: ImageService,
}

impl GoalService {
    pub fn new(db: DbConn, images: ImageService) -> Self {
        Self { db, images }
    }

    pub async fn create(&self, new_goal: NewGoal) -> Result<goal::Model> {
        let now = Utc::now();
        let created = goal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_goal.user_id),
            title: Set(new_goal.title),
            description: Set(new_goal.description),
            target_date: Set(new_goal.target_date),
            is_ai_generated: Set(new_goal.is_ai_generated),
            status: Set(new_goal.status),
            image_id: Set(new_goal.image_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(goal_id = %created.id, user_id = %created.user_id, "Created goal");
        Ok(created)
    }

    /// Paged goals of one status (ACTIVE when unspecified)
    pub async fn get(
        &self,
        user_id: Uuid,
        status: Option<GoalStatus>,
        pageable: &PageableRequest,
    ) -> Result<Page<GoalResponse>> {
        let query = Goal::find()
            .filter(goal::Column::UserId.eq(user_id))
            .filter(goal::Column::Status.eq(status.unwrap_or(GoalStatus::Active)))
            .filter(goal::Column::DeletedAt.is_null());

        let total = query.clone().count(&self.db).await?;
        let goals = query
            .order_by(sort_column(pageable.sort()), pageable.order())
            .offset(pageable.offset())
            .limit(pageable.size())
            .all(&self.db)
            .await?;

        let mut content = Vec::with_capacity(goals.len());
        for found in goals {
            content.push(self.to_response(found).await?);
        }

        Ok(Page::new(content, pageable, total))
    }

    pub async fn get_by_id(&self, user_id: Uuid, goal_id: Uuid) -> Result<GoalResponse> {
        let found = self.find_owned(user_id, goal_id).await?;
        self.to_response(found).await
    }

    /// Live goal that belongs to `user_id`
    pub async fn find_owned(&self, user_id: Uuid, goal_id: Uuid) -> Result<goal::Model> {
        let found = Goal::find_by_id(goal_id)
            .filter(goal::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(GoalError::GoalNotFound(goal_id))?;

        if found.user_id != user_id {
            return Err(GoalError::AccessDenied(goal_id).into());
        }
        Ok(found)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        patch: UpdateGoalRequest,
    ) -> Result<GoalResponse> {
        let found = self.find_owned(user_id, goal_id).await?;
        let mut active = found.into_active_model();

        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(target_date) = patch.target_date {
            active.target_date = Set(target_date);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(image_id) = patch.image_id {
            active.image_id = Set(Some(image_id));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        self.to_response(updated).await
    }

    pub async fn delete(&self, user_id: Uuid, goal_id: Uuid) -> Result<()> {
        let found = self.find_owned(user_id, goal_id).await?;
        let now = Utc::now();

        let mut active = found.into_active_model();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::debug!(goal_id = %goal_id, "Soft-deleted goal");
        Ok(())
    }

    /// Every live goal of a user, any status
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<goal::Model>> {
        Ok(Goal::find()
            .filter(goal::Column::UserId.eq(user_id))
            .filter(goal::Column::DeletedAt.is_null())
            .order_by_asc(goal::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, goal_id: Uuid) -> Result<Option<goal::Model>> {
        Ok(Goal::find_by_id(goal_id)
            .filter(goal::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    pub async fn image_path(&self, found: &goal::Model) -> Option<String> {
        self.images.path_of_lenient(found.image_id).await
    }

    async fn to_response(&self, found: goal::Model) -> Result<GoalResponse> {
        let live_schedules = Schedule::find()
            .filter(schedule::Column::GoalId.eq(found.id))
            .filter(schedule::Column::DeletedAt.is_null());

        let total = live_schedules.clone().count(&self.db).await?;
        let completed = live_schedules
            .filter(schedule::Column::Status.eq(ScheduleStatus::Completed))
            .count(&self.db)
            .await?;
        let image_path = self.image_path(&found).await;

        Ok(GoalResponse::from_model(found, image_path, total, completed))
    }
}

fn sort_column(key: &str) -> goal::Column {
    match key {
        "updatedAt" => goal::Column::UpdatedAt,
        "targetDate" => goal::Column::TargetDate,
        "title" => goal::Column::Title,
        "status" => goal::Column::Status,
        _ => goal::Column::CreatedAt,
    }
}
