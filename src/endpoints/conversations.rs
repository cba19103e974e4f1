use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::{AppPath, AppQuery, Authenticated};
use crate::schemas::assistant::ChatMessageResponse;
use crate::schemas::common::{PageableRequest, ServiceResponse};
use crate::schemas::conversation::ConversationResponse;
use crate::state::AppState;

pub fn conversations_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_conversations))
        .route("/{conversationId}", delete(delete_conversation))
        .route("/{conversationId}/messages", get(get_messages))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    tag = "Conversations",
    params(PageableRequest),
    responses(
        (status = 200, body = Vec<ConversationResponse>)
    )
)]
async fn get_conversations(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<ConversationResponse>>> {
    let page = state.conversations.get(auth.0.id, &pageable).await?;
    Ok(ServiceResponse::from_page(page))
}

#[utoipa::path(
    delete,
    path = "/api/v1/conversations/{conversationId}",
    tag = "Conversations",
    params(("conversationId" = Uuid, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Conversation deleted"),
        (status = 404, description = "Conversation not found")
    )
)]
async fn delete_conversation(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(conversation_id): AppPath<Uuid>,
) -> Result<ServiceResponse<()>> {
    state.conversations.delete(auth.0.id, conversation_id).await?;
    Ok(ServiceResponse::from_message("대화가 삭제되었습니다."))
}

/// Messages newest page first; each page is in chronological order
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{conversationId}/messages",
    tag = "Conversations",
    params(("conversationId" = Uuid, Path, description = "Conversation ID"), PageableRequest),
    responses(
        (status = 200, body = Vec<ChatMessageResponse>),
        (status = 404, description = "Conversation not found")
    )
)]
async fn get_messages(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(conversation_id): AppPath<Uuid>,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<ChatMessageResponse>>> {
    let page = state
        .conversations
        .get_messages(auth.0.id, conversation_id, &pageable)
        .await?;
    Ok(ServiceResponse::from_page(page))
}
