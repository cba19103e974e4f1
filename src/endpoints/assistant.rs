//! Chat with the goal assistant.

use axum::{extract::State, routing::post, Router};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::{AppJson, AppPath, Authenticated};
use crate::schemas::assistant::{AssistantRequest, ChatResponse, StartChatResponse};
use crate::schemas::common::ServiceResponse;
use crate::state::AppState;

pub fn assistant_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(start_chat))
        .route("/{conversationId}", post(send_message))
        .route("/{conversationId}/feedback", post(feedback))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/chat",
    tag = "Assistant",
    responses(
        (status = 200, body = StartChatResponse)
    )
)]
async fn start_chat(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ServiceResponse<StartChatResponse>> {
    let started = state.assistant.start_chat(auth.0.id).await?;
    Ok(ServiceResponse::from_data(started))
}

#[utoipa::path(
    post,
    path = "/api/v1/chat/{conversationId}",
    tag = "Assistant",
    params(("conversationId" = Uuid, Path, description = "Conversation ID")),
    request_body = AssistantRequest,
    responses(
        (status = 200, body = ChatResponse),
        (status = 404, description = "Conversation not found"),
        (status = 500, description = "Inference failed")
    )
)]
async fn send_message(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(conversation_id): AppPath<Uuid>,
    AppJson(request): AppJson<AssistantRequest>,
) -> Result<ServiceResponse<ChatResponse>> {
    let reply = state
        .assistant
        .send_message(conversation_id, auth.0.id, &request.text)
        .await?;
    Ok(ServiceResponse::from_data(reply))
}

/// On-demand feedback for the goal linked to the conversation
#[utoipa::path(
    post,
    path = "/api/v1/chat/{conversationId}/feedback",
    tag = "Assistant",
    params(("conversationId" = Uuid, Path, description = "Conversation ID")),
    responses(
        (status = 200, body = ChatResponse),
        (status = 404, description = "Conversation or goal not found")
    )
)]
async fn feedback(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(conversation_id): AppPath<Uuid>,
) -> Result<ServiceResponse<ChatResponse>> {
    let reply = state.feedback.feedback(conversation_id, auth.0.id).await?;
    Ok(ServiceResponse::from_data(reply))
}
