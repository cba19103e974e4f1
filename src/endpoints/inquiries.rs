use axum::{extract::State, http::StatusCode, routing::post, Router};

use crate::error::Result;
use crate::middleware::{AppJson, Authenticated};
use crate::schemas::common::ServiceResponse;
use crate::schemas::inquiry::{CreateInquiryRequest, InquiryResponse};
use crate::state::AppState;

pub fn inquiries_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_inquiry))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/inquiries",
    tag = "Inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, body = InquiryResponse),
        (status = 400, description = "Empty or oversized content, or malformed email")
    )
)]
async fn create_inquiry(
    State(state): State<AppState>,
    auth: Authenticated,
    AppJson(request): AppJson<CreateInquiryRequest>,
) -> Result<ServiceResponse<InquiryResponse>> {
    let created = state.inquiries.create(auth.0.id, request).await?;
    Ok(ServiceResponse::from_data(InquiryResponse::from(created)).with_status(StatusCode::CREATED))
}
