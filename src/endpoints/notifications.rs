use axum::{
    extract::State,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::{AppPath, AppQuery, Authenticated};
use crate::schemas::common::{PageableRequest, ServiceResponse};
use crate::schemas::notification::{CheckAllResponse, NotificationResponse};
use crate::state::AppState;

pub fn notifications_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/count", get(get_unchecked_count))
        .route("/check", patch(check_all))
        .route("/{notificationId}/check", patch(check_notification))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/count",
    tag = "Notifications",
    responses(
        (status = 200, body = u64, description = "Unchecked notification count")
    )
)]
async fn get_unchecked_count(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ServiceResponse<u64>> {
    let count = state.notifications.count_unchecked(auth.0.id).await?;
    Ok(ServiceResponse::from_data(count))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    params(PageableRequest),
    responses(
        (status = 200, body = Vec<NotificationResponse>)
    )
)]
async fn get_notifications(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<NotificationResponse>>> {
    let page = state.notifications.get(auth.0.id, &pageable).await?;
    Ok(ServiceResponse::from_page(page.map(NotificationResponse::from)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{notificationId}/check",
    tag = "Notifications",
    params(("notificationId" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
async fn check_notification(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(notification_id): AppPath<Uuid>,
) -> Result<ServiceResponse<NotificationResponse>> {
    let checked = state.notifications.check(auth.0.id, notification_id).await?;
    Ok(ServiceResponse::from_data(checked.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/check",
    tag = "Notifications",
    responses(
        (status = 200, body = CheckAllResponse)
    )
)]
async fn check_all(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<ServiceResponse<CheckAllResponse>> {
    let checked = state.notifications.check_all(auth.0.id).await?;
    Ok(ServiceResponse::from_data(CheckAllResponse { checked }))
}
