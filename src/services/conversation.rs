use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{AssistantError, AuthError, Result};
use crate::models::chat::{self, ChatType};
use crate::models::{conversation, goal};
use crate::models::prelude::*;
use crate::schemas::assistant::{AssistantResponse, AssistantResponsePayload, ChatMessageResponse};
use crate::schemas::common::{Page, PageableRequest};
use crate::schemas::conversation::ConversationResponse;
use crate::state::DbConn;

/// Latest chat time of a conversation, or its creation time when it has none
fn recent_activity() -> sea_orm::sea_query::SimpleExpr {
    Expr::cust(
        "COALESCE((SELECT MAX(chat.created_at) FROM chat \
         WHERE chat.conversation_id = conversations.id), conversations.created_at)",
    )
}

/// Decode a stored chat into response blocks.
///
/// USER rows hold raw text. ASSISTANT rows hold the JSON of the block list;
/// rows that fail to parse are shown as a single text block.
pub fn chat_payloads(stored: &chat::Model) -> Vec<AssistantResponsePayload> {
    match stored.chat_type {
        ChatType::User => vec![AssistantResponsePayload::text(vec![stored.content.clone()])],
        ChatType::Assistant => serde_json::from_str(&stored.content).unwrap_or_else(|e| {
            tracing::warn!(chat_id = stored.id, error = %e, "Unparsable assistant chat content");
            vec![AssistantResponsePayload::text(vec![stored.content.clone()])]
        }),
    }
}

fn preview(stored: &chat::Model) -> String {
    AssistantResponse {
        responses: chat_payloads(stored),
    }
    .first_text()
    .unwrap_or_default()
    .to_string()
}

#[derive(Clone)]
pub struct ConversationService {
    db: DbConn,
}

impl ConversationService {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, goal_id: Option<Uuid>) -> Result<conversation::Model> {
        Ok(conversation::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            goal_id: Set(goal_id),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_by_id(&self, conversation_id: Uuid) -> Result<conversation::Model> {
        Conversation::find_by_id(conversation_id)
            .filter(conversation::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AssistantError::ConversationNotFound(conversation_id).into())
    }

    pub fn validate_owner(&self, found: &conversation::Model, user_id: Uuid) -> Result<()> {
        if found.user_id != user_id {
            return Err(AuthError::Unauthorized.into());
        }
        Ok(())
    }

    pub async fn find_owned(&self, user_id: Uuid, conversation_id: Uuid) -> Result<conversation::Model> {
        let found = self.find_by_id(conversation_id).await?;
        self.validate_owner(&found, user_id)?;
        Ok(found)
    }

    pub async fn link_goal(&self, conversation_id: Uuid, goal_id: Uuid) -> Result<conversation::Model> {
        let found = self.find_by_id(conversation_id).await?;
        let mut active = found.into_active_model();
        active.goal_id = Set(Some(goal_id));
        Ok(active.update(&self.db).await?)
    }

    /// The goal's conversation, opened on first use
    pub async fn find_or_create_for_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
    ) -> Result<conversation::Model> {
        let existing = Conversation::find()
            .filter(conversation::Column::GoalId.eq(goal_id))
            .filter(conversation::Column::UserId.eq(user_id))
            .filter(conversation::Column::DeletedAt.is_null())
            .order_by_asc(conversation::Column::CreatedAt)
            .one(&self.db)
            .await?;

        match existing {
            Some(found) => Ok(found),
            None => self.create(user_id, Some(goal_id)).await,
        }
    }

    pub async fn delete(&self, user_id: Uuid, conversation_id: Uuid) -> Result<()> {
        let found = self.find_owned(user_id, conversation_id).await?;
        let mut active = found.into_active_model();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        pageable: &PageableRequest,
    ) -> Result<Page<ConversationResponse>> {
        let query = Conversation::find()
            .filter(conversation::Column::UserId.eq(user_id))
            .filter(conversation::Column::DeletedAt.is_null());

        let total = query.clone().count(&self.db).await?;
        let conversations = query
            .order_by(recent_activity(), pageable.order())
            .order_by(conversation::Column::CreatedAt, pageable.order())
            .offset(pageable.offset())
            .limit(pageable.size())
            .all(&self.db)
            .await?;

        let mut content = Vec::with_capacity(conversations.len());
        for found in conversations {
            let latest = Chat::find()
                .filter(chat::Column::ConversationId.eq(found.id))
                .order_by_desc(chat::Column::Id)
                .one(&self.db)
                .await?;

            let goal_title = match found.goal_id {
                Some(goal_id) => Goal::find_by_id(goal_id)
                    .filter(goal::Column::DeletedAt.is_null())
                    .one(&self.db)
                    .await?
                    .map(|g| g.title),
                None => None,
            };

            content.push(ConversationResponse {
                conversation_id: found.id,
                recent_chat: latest.as_ref().map(preview).unwrap_or_default(),
                recent_at: latest.map(|c| c.created_at).unwrap_or(found.created_at),
                goal_id: found.goal_id,
                goal_title,
            });
        }

        Ok(Page::new(content, pageable, total))
    }

    /// Newest page first, oldest-first within the page
    pub async fn get_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        pageable: &PageableRequest,
    ) -> Result<Page<ChatMessageResponse>> {
        self.find_owned(user_id, conversation_id).await?;

        let query = Chat::find().filter(chat::Column::ConversationId.eq(conversation_id));
        let total = query.clone().count(&self.db).await?;
        let mut chats = query
            .order_by_desc(chat::Column::Id)
            .offset(pageable.offset())
            .limit(pageable.size())
            .all(&self.db)
            .await?;
        chats.reverse();

        let content = chats
            .into_iter()
            .map(|stored| ChatMessageResponse {
                chat: chat_payloads(&stored),
                chat_id: stored.id,
                conversation_id: stored.conversation_id,
                chat_type: stored.chat_type,
                created_at: stored.created_at,
            })
            .collect();

        Ok(Page::new(content, pageable, total))
    }

    pub async fn save_user_chat(&self, conversation_id: Uuid, text: &str) -> Result<chat::Model> {
        self.save_chat(conversation_id, ChatType::User, text.to_string()).await
    }

    pub async fn save_assistant_chat(
        &self,
        conversation_id: Uuid,
        response: &AssistantResponse,
    ) -> Result<chat::Model> {
        let content = serde_json::to_string(&response.responses)?;
        self.save_chat(conversation_id, ChatType::Assistant, content).await
    }

    async fn save_chat(
        &self,
        conversation_id: Uuid,
        chat_type: ChatType,
        content: String,
    ) -> Result<chat::Model> {
        Ok(chat::ActiveModel {
            conversation_id: Set(conversation_id),
            content: Set(content),
            chat_type: Set(chat_type),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    /// Last `limit` chats, oldest first
    pub async fn recent_chats(&self, conversation_id: Uuid, limit: u64) -> Result<Vec<chat::Model>> {
        let mut chats = Chat::find()
            .filter(chat::Column::ConversationId.eq(conversation_id))
            .order_by_desc(chat::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        chats.reverse();
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::user::OAuth2Provider;
    use crate::test_helpers::{create_test_db, insert_user};

    #[test]
    fn test_chat_payloads_fallback() {
        let stored = chat::Model {
            id: 1,
            conversation_id: Uuid::new_v4(),
            content: "not json".to_string(),
            chat_type: ChatType::Assistant,
            created_at: Utc::now(),
        };
        assert_eq!(
            chat_payloads(&stored),
            vec![AssistantResponsePayload::text(vec!["not json".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_messages_are_oldest_first_within_page() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Google, "c-1").await;
        let service = ConversationService::new(db);
        let conversation = service.create(user.id, None).await.unwrap();

        for i in 0..5 {
            service
                .save_user_chat(conversation.id, &format!("m{}", i))
                .await
                .unwrap();
        }

        let page = service
            .get_messages(user.id, conversation.id, &PageableRequest::of(0, 2))
            .await
            .unwrap();
        let texts: Vec<_> = page
            .content
            .iter()
            .map(|m| m.chat[0].messages[0].clone())
            .collect();
        assert_eq!(texts, vec!["m3", "m4"]);
        assert_eq!(page.total_elements, 5);
    }

    #[tokio::test]
    async fn test_preview_and_ownership() {
        let db = create_test_db().await;
        let owner = insert_user(&db, OAuth2Provider::Google, "c-2").await;
        let other = insert_user(&db, OAuth2Provider::Google, "c-3").await;
        let service = ConversationService::new(db);
        let conversation = service.create(owner.id, None).await.unwrap();

        service
            .save_assistant_chat(
                conversation.id,
                &AssistantResponse {
                    responses: vec![
                        AssistantResponsePayload::quick_replies(vec!["네".to_string()]),
                        AssistantResponsePayload::text(vec!["좋아요".to_string()]),
                    ],
                },
            )
            .await
            .unwrap();

        let page = service.get(owner.id, &PageableRequest::default()).await.unwrap();
        assert_eq!(page.content[0].recent_chat, "좋아요");

        assert!(matches!(
            service.get_messages(other.id, conversation.id, &PageableRequest::default()).await,
            Err(AppError::Auth(AuthError::Unauthorized))
        ));

        service.delete(owner.id, conversation.id).await.unwrap();
        assert!(matches!(
            service.find_by_id(conversation.id).await,
            Err(AppError::Assistant(AssistantError::ConversationNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_find_or_create_for_goal_reuses_conversation() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Kakao, "c-4").await;
        let service = ConversationService::new(db);
        let goal_id = Uuid::new_v4();

        let first = service.find_or_create_for_goal(user.id, goal_id).await.unwrap();
        let second = service.find_or_create_for_goal(user.id, goal_id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.goal_id, Some(goal_id));
    }
    async fn backdate(db: &DbConn, found: conversation::Model, minutes: i64) {
        let mut active = found.into_active_model();
        active.created_at = Set(Utc::now() - chrono::Duration::minutes(minutes));
        active.update(db).await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_puts_latest_activity_first() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Google, "c-5").await;
        let service = ConversationService::new(db.clone());

        let older = service.create(user.id, None).await.unwrap();
        let newer = service.create(user.id, None).await.unwrap();
        backdate(&db, older.clone(), 60).await;
        backdate(&db, newer.clone(), 30).await;
        service.save_user_chat(older.id, "still here").await.unwrap();

        let page = service.get(user.id, &PageableRequest::default()).await.unwrap();
        let ids: Vec<_> = page.content.iter().map(|c| c.conversation_id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
        assert_eq!(page.content[0].recent_chat, "still here");
    }

    #[tokio::test]
    async fn test_listing_hides_deleted_goal_title() {
        let db = create_test_db().await;
        let user = insert_user(&db, OAuth2Provider::Kakao, "c-6").await;
        let now = Utc::now();
        let stored = goal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            title: Set("Gone".to_string()),
            description: Set(None),
            target_date: Set(chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
            is_ai_generated: Set(false),
            status: Set(goal::GoalStatus::Active),
            image_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&db)
        .await
        .unwrap();
        let service = ConversationService::new(db.clone());
        service.find_or_create_for_goal(user.id, stored.id).await.unwrap();

        let page = service.get(user.id, &PageableRequest::default()).await.unwrap();
        assert_eq!(page.content[0].goal_title.as_deref(), Some("Gone"));

        let mut active = stored.into_active_model();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&db).await.unwrap();

        let page = service.get(user.id, &PageableRequest::default()).await.unwrap();
        assert!(page.content[0].goal_id.is_some());
        assert_eq!(page.content[0].goal_title, None);
    }
}
