use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, CommonError, ImageError, Result};
use crate::middleware::Authenticated;
use crate::schemas::common::ServiceResponse;
use crate::services::image::UploadedFile;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn images_routes(state: AppState) -> Router {
    let body_limit = state.images.config().max_file_size as usize + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", post(upload_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Multipart body; only the `file` part is read
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_id: Uuid,
    pub file_path: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/images",
    tag = "Images",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = ImageUploadResponse),
        (status = 400, description = "Missing file, unsupported type or too large")
    )
)]
async fn upload_image(
    State(state): State<AppState>,
    auth: Authenticated,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ServiceResponse<ImageUploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "Rejected upload body");
        AppError::from(CommonError::InvalidMediaType)
    })?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = upload.ok_or(ImageError::MissingFile)?;
    let stored = state.images.upload(auth.0.id, file).await?;

    Ok(ServiceResponse::from_data(ImageUploadResponse {
        image_id: stored.id,
        file_path: stored.file_path,
    })
    .with_status(StatusCode::CREATED))
}
