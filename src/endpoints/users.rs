//! Account withdrawal and AI feedback notification preferences.

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};

use crate::error::{AppError, Result};
use crate::middleware::{AppJson, Authenticated};
use crate::schemas::common::ServiceResponse;
use crate::schemas::user::{
    NotificationSettingsResponse, UpdateAiFeedbackEnabledRequest, UpdateAiFeedbackTimeRequest,
    UpdateNotificationSettingsRequest, WithdrawUserRequest,
};
use crate::services::cookie::append_cookies;
use crate::state::AppState;

pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/users/withdraw", patch(withdraw))
        .route(
            "/user/notification-settings",
            get(get_notification_settings).patch(update_notification_settings),
        )
        .route(
            "/user/notification-settings/ai-feedback-enabled",
            patch(update_ai_feedback_enabled),
        )
        .route(
            "/user/notification-settings/ai-feedback-notification-time",
            patch(update_ai_feedback_time),
        )
        .with_state(state)
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/withdraw",
    tag = "Users",
    request_body = WithdrawUserRequest,
    responses(
        (status = 200, description = "Account withdrawn, session cookies cleared")
    )
)]
async fn withdraw(
    State(state): State<AppState>,
    auth: Authenticated,
    body: Bytes,
) -> Result<Response> {
    // The body is optional; an empty request withdraws without a reason
    let reason = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<WithdrawUserRequest>(&body)
            .map_err(|e| AppError::invalid_request(e.to_string()))?
            .reason
    };
    state.users.withdraw(auth.0.id, reason.as_deref()).await?;

    let mut response = ServiceResponse::<()>::from_message("회원 탈퇴가 완료되었습니다.").into_response();
    append_cookies(response.headers_mut(), state.cookies.expired_token_cookies());
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v1/user/notification-settings",
    tag = "Users",
    responses(
        (status = 200, body = NotificationSettingsResponse)
    )
)]
async fn get_notification_settings(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ServiceResponse<NotificationSettingsResponse>> {
    let settings = state.users.notification_settings(auth.0.id).await?;
    Ok(ServiceResponse::from_data(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/notification-settings",
    tag = "Users",
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 200, body = NotificationSettingsResponse)
    )
)]
async fn update_notification_settings(
    State(state): State<AppState>,
    auth: Authenticated,
    AppJson(request): AppJson<UpdateNotificationSettingsRequest>,
) -> Result<ServiceResponse<NotificationSettingsResponse>> {
    let settings = state
        .users
        .update_notification_settings(
            auth.0.id,
            request.ai_feedback_enabled,
            request.ai_feedback_notification_time.map(|t| t.0),
        )
        .await?;
    Ok(ServiceResponse::from_data(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/notification-settings/ai-feedback-enabled",
    tag = "Users",
    request_body = UpdateAiFeedbackEnabledRequest,
    responses(
        (status = 200, body = NotificationSettingsResponse)
    )
)]
async fn update_ai_feedback_enabled(
    State(state): State<AppState>,
    auth: Authenticated,
    AppJson(request): AppJson<UpdateAiFeedbackEnabledRequest>,
) -> Result<ServiceResponse<NotificationSettingsResponse>> {
    let settings = state
        .users
        .update_feedback_enabled(auth.0.id, request.ai_feedback_enabled)
        .await?;
    Ok(ServiceResponse::from_data(settings.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/notification-settings/ai-feedback-notification-time",
    tag = "Users",
    request_body = UpdateAiFeedbackTimeRequest,
    responses(
        (status = 200, body = NotificationSettingsResponse)
    )
)]
async fn update_ai_feedback_time(
    State(state): State<AppState>,
    auth: Authenticated,
    AppJson(request): AppJson<UpdateAiFeedbackTimeRequest>,
) -> Result<ServiceResponse<NotificationSettingsResponse>> {
    let settings = state
        .users
        .update_feedback_time(auth.0.id, request.ai_feedback_notification_time.0)
        .await?;
    Ok(ServiceResponse::from_data(settings.into()))
}
