use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::prelude::*;
use crate::models::user::OAuth2Provider;
use crate::models::user_withdrawal::WithdrawalReason;
use crate::models::{refresh_token, user, user_notification_settings, user_withdrawal};
use crate::state::DbConn;

/// 09:00
pub fn default_feedback_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

#[derive(Clone)]
pub struct UserService {
    db: DbConn,
}

impl UserService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Active user for an identity, created on first login
    pub async fn find_or_create(
        &self,
        provider: OAuth2Provider,
        provider_id: &str,
    ) -> Result<user::Model> {
        let existing = User::find()
            .filter(user::Column::Provider.eq(provider))
            .filter(user::Column::ProviderId.eq(provider_id))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        if let Some(found) = existing {
            return Ok(found);
        }

        let now = Utc::now();
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            provider: Set(provider),
            provider_id: Set(provider_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id = %created.id, provider = %provider, "Created user");
        Ok(created)
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Option<user::Model>> {
        Ok(User::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    pub async fn get_active(&self, id: Uuid) -> Result<user::Model> {
        self.find_active(id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(id).into())
    }

    pub async fn list_active(&self) -> Result<Vec<user::Model>> {
        Ok(User::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Soft-delete the account, drop its refresh token, and record a
    /// recognised reason
    pub async fn withdraw(&self, user_id: Uuid, reason: Option<&str>) -> Result<()> {
        let found = self.get_active(user_id).await?;

        let now = Utc::now();
        let mut active = found.into_active_model();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        refresh_token::Entity::delete_by_id(user_id).exec(&self.db).await?;

        if let Some(reason) = reason.and_then(WithdrawalReason::from_display_name) {
            user_withdrawal::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                reason: Set(reason),
                created_at: Set(now),
            }
            .insert(&self.db)
            .await?;
        }

        tracing::info!(user_id = %user_id, "User withdrew");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Notification settings
    // ------------------------------------------------------------------------

    /// Settings row for the user, created with defaults on first access
    pub async fn notification_settings(
        &self,
        user_id: Uuid,
    ) -> Result<user_notification_settings::Model> {
        let existing = UserNotificationSettings::find()
            .filter(user_notification_settings::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        if let Some(settings) = existing {
            return Ok(settings);
        }

        let now = Utc::now();
        let created = user_notification_settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            ai_feedback_enabled: Set(true),
            ai_feedback_notification_time: Set(default_feedback_time()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    pub async fn update_notification_settings(
        &self,
        user_id: Uuid,
        enabled: Option<bool>,
        time: Option<NaiveTime>,
    ) -> Result<user_notification_settings::Model> {
        let settings = self.notification_settings(user_id).await?;

        let mut active = settings.into_active_model();
        if let Some(enabled) = enabled {
            active.ai_feedback_enabled = Set(enabled);
        }
        if let Some(time) = time {
            active.ai_feedback_notification_time = Set(time);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn update_feedback_enabled(
        &self,
        user_id: Uuid,
        enabled: bool,
    ) -> Result<user_notification_settings::Model> {
        self.update_notification_settings(user_id, Some(enabled), None)
            .await
    }

    pub async fn update_feedback_time(
        &self,
        user_id: Uuid,
        time: NaiveTime,
    ) -> Result<user_notification_settings::Model> {
        self.update_notification_settings(user_id, None, Some(time))
            .await
    }
}
