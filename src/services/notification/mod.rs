mod event;
mod listener;

pub use event::NotificationEvent;
pub use listener::{NotificationListener, NotificationPublisher};

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{NotificationError, Result};
use crate::models::notification;
use crate::models::prelude::*;
use crate::schemas::common::{Page, PageableRequest};
use crate::schemas::notification::CreateNotification;
use crate::state::DbConn;

#[derive(Clone)]
pub struct NotificationService {
    db: DbConn,
}

impl NotificationService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateNotification) -> Result<notification::Model> {
        let now = Utc::now();
        let metadata = serde_json::to_string(&request.metadata)?;

        let created = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            notification_type: Set(request.notification_type),
            title: Set(request.title),
            description: Set(request.description),
            metadata: Set(metadata),
            receiver_id: Set(request.receiver_id),
            checked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    pub async fn count_unchecked(&self, user_id: Uuid) -> Result<u64> {
        Ok(Notification::find()
            .filter(notification::Column::ReceiverId.eq(user_id))
            .filter(notification::Column::Checked.eq(false))
            .filter(notification::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?)
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        pageable: &PageableRequest,
    ) -> Result<Page<notification::Model>> {
        let query = Notification::find()
            .filter(notification::Column::ReceiverId.eq(user_id))
            .filter(notification::Column::DeletedAt.is_null());

        let total = query.clone().count(&self.db).await?;
        let content = query
            .order_by(sort_column(pageable.sort()), pageable.order())
            .offset(pageable.offset())
            .limit(pageable.size())
            .all(&self.db)
            .await?;

        Ok(Page::new(content, pageable, total))
    }

    /// Mark one notification read. Checking an already checked row is a no-op.
    pub async fn check(&self, user_id: Uuid, notification_id: Uuid) -> Result<notification::Model> {
        let found = Notification::find_by_id(notification_id)
            .filter(notification::Column::ReceiverId.eq(user_id))
            .filter(notification::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(NotificationError::NotificationNotFound(notification_id))?;

        if found.checked {
            return Ok(found);
        }

        let mut active = found.into_active_model();
        active.checked = Set(true);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    /// Mark every unread notification of the user read
    pub async fn check_all(&self, user_id: Uuid) -> Result<u64> {
        let result = Notification::update_many()
            .col_expr(notification::Column::Checked, Expr::value(true))
            .col_expr(notification::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification::Column::ReceiverId.eq(user_id))
            .filter(notification::Column::Checked.eq(false))
            .filter(notification::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

fn sort_column(key: &str) -> notification::Column {
    match key {
        "updatedAt" => notification::Column::UpdatedAt,
        "checked" => notification::Column::Checked,
        "title" => notification::Column::Title,
        _ => notification::Column::CreatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::user::OAuth2Provider;
    use crate::test_helpers::{create_test_db, insert_user};

    fn feedback(receiver_id: Uuid) -> CreateNotification {
        CreateNotification::from(&NotificationEvent::Feedback {
            goal_title: "Run 5k".to_string(),
            conversation_id: Uuid::new_v4(),
            receiver_id,
        })
    }

    #[tokio::test]
    async fn test_check_is_idempotent() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Google, "n-1").await;
        let service = NotificationService::new(db);

        let created = service.create(feedback(user.id)).await.unwrap();
        assert!(!created.checked);

        let first = service.check(user.id, created.id).await.unwrap();
        let second = service.check(user.id, created.id).await.unwrap();
        assert!(first.checked);
        assert!(second.checked);
        assert_eq!(service.count_unchecked(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_check_requires_ownership() {
        let db = create_test_db().await;
        let owner = insert_user(&db, OAuth2Provider::Google, "n-2").await;
        let other = insert_user(&db, OAuth2Provider::Google, "n-3").await;
        let service = NotificationService::new(db);

        let created = service.create(feedback(owner.id)).await.unwrap();
        assert!(matches!(
            service.check(other.id, created.id).await,
            Err(AppError::Notification(NotificationError::NotificationNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_check_all_counts_and_pages() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Kakao, "n-4").await;
        let service = NotificationService::new(db);

        for _ in 0..3 {
            service.create(feedback(user.id)).await.unwrap();
        }
        assert_eq!(service.count_unchecked(user.id).await.unwrap(), 3);

        let page = service
            .get(user.id, &PageableRequest::of(0, 2))
            .await
            .unwrap();
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages(), 2);

        assert_eq!(service.check_all(user.id).await.unwrap(), 3);
        assert_eq!(service.check_all(user.id).await.unwrap(), 0);
        assert_eq!(service.count_unchecked(user.id).await.unwrap(), 0);
    }
}
