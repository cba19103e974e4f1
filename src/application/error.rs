use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::schemas::common::ServiceResponse;

/// A domain error that knows how it is reported to clients.
///
/// The public error code is `"<MAIN_CODE>:<NAME>"`, e.g. `GOAL:GOALNOTFOUND`.
pub trait ServiceError: std::error::Error {
    const MAIN_CODE: &'static str;

    fn status(&self) -> StatusCode;

    /// Variant name, upper-cased without separators
    fn name(&self) -> &'static str;

    fn error_code(&self) -> String {
        format!("{}:{}", Self::MAIN_CODE, self.name())
    }
}

// ============================================================================
// Per-context errors
// ============================================================================

#[derive(Debug, Error)]
pub enum CommonError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("요청한 리소스를 찾을 수 없습니다: {0}")]
    NoResourceFound(String),

    #[error("지원하지 않는 HTTP 메서드입니다.")]
    InvalidMethod,

    #[error("지원하지 않는 미디어 타입입니다.")]
    InvalidMediaType,

    #[error("서버 내부 오류가 발생했습니다.")]
    InternalServerError(String),
}

impl ServiceError for CommonError {
    const MAIN_CODE: &'static str = "COMMON";

    fn status(&self) -> StatusCode {
        match self {
            CommonError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CommonError::NoResourceFound(_) => StatusCode::NOT_FOUND,
            CommonError::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            CommonError::InvalidMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CommonError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CommonError::InvalidRequest(_) => "INVALIDREQUEST",
            CommonError::NoResourceFound(_) => "NORESOURCEFOUND",
            CommonError::InvalidMethod => "INVALIDMETHOD",
            CommonError::InvalidMediaType => "INVALIDMEDIATYPE",
            CommonError::InternalServerError(_) => "INTERNALSERVERERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("인증이 필요합니다. 로그인을 진행해주세요.")]
    Unauthorized,

    #[error("유효하지 않은 액세스 토큰입니다.")]
    InvalidAccessToken,

    #[error("유효하지 않은 리프레시 토큰입니다.")]
    InvalidRefreshToken,

    #[error("사용자를 찾을 수 없습니다. userId: {0}")]
    UserNotFound(Uuid),
}

impl ServiceError for AuthError {
    const MAIN_CODE: &'static str = "AUTH";

    fn status(&self) -> StatusCode {
        match self {
            AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::InvalidAccessToken => "INVALIDACCESSTOKEN",
            AuthError::InvalidRefreshToken => "INVALIDREFRESHTOKEN",
            AuthError::UserNotFound(_) => "USERNOTFOUND",
        }
    }
}

#[derive(Debug, Error)]
pub enum GoalError {
    #[error("목표를 찾을 수 없습니다. goalId: {0}")]
    GoalNotFound(Uuid),

    #[error("해당 목표에 접근할 권한이 없습니다. goalId: {0}")]
    AccessDenied(Uuid),
}

impl ServiceError for GoalError {
    const MAIN_CODE: &'static str = "GOAL";

    fn status(&self) -> StatusCode {
        match self {
            GoalError::GoalNotFound(_) => StatusCode::NOT_FOUND,
            GoalError::AccessDenied(_) => StatusCode::FORBIDDEN,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            GoalError::GoalNotFound(_) => "GOALNOTFOUND",
            GoalError::AccessDenied(_) => "ACCESSDENIED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("일정을 찾을 수 없습니다. scheduleId: {0}")]
    ScheduleNotFound(Uuid),

    #[error("해당 일정에 접근할 권한이 없습니다. scheduleId: {0}")]
    AccessDenied(Uuid),

    #[error("시작일은 종료일보다 이전이거나 같아야 합니다.")]
    InvalidDateRange,
}

impl ServiceError for ScheduleError {
    const MAIN_CODE: &'static str = "SCHEDULE";

    fn status(&self) -> StatusCode {
        match self {
            ScheduleError::ScheduleNotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::AccessDenied(_) => StatusCode::FORBIDDEN,
            ScheduleError::InvalidDateRange => StatusCode::BAD_REQUEST,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ScheduleError::ScheduleNotFound(_) => "SCHEDULENOTFOUND",
            ScheduleError::AccessDenied(_) => "ACCESSDENIED",
            ScheduleError::InvalidDateRange => "INVALIDDATERANGE",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("알림을 찾을 수 없습니다. notificationId: {0}")]
    NotificationNotFound(Uuid),
}

impl ServiceError for NotificationError {
    const MAIN_CODE: &'static str = "NOTIFICATION";

    fn status(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    fn name(&self) -> &'static str {
        match self {
            NotificationError::NotificationNotFound(_) => "NOTIFICATIONNOTFOUND",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("지원하지 않는 파일 형식입니다: {0}")]
    UnsupportedFileType(String),

    #[error("파일 크기가 제한을 초과했습니다. (최대 {max} bytes, 요청 {size} bytes)")]
    FileSizeExceeded { size: u64, max: u64 },

    #[error("업로드할 파일이 없습니다.")]
    MissingFile,
}

impl ServiceError for ImageError {
    const MAIN_CODE: &'static str = "IMAGE";

    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn name(&self) -> &'static str {
        match self {
            ImageError::UnsupportedFileType(_) => "UNSUPPORTEDFILETYPE",
            ImageError::FileSizeExceeded { .. } => "FILESIZEEXCEEDED",
            ImageError::MissingFile => "MISSINGFILE",
        }
    }
}

#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("문의 내용은 1자 이상 1000자 이하로 입력해주세요.")]
    InvalidContent,

    #[error("올바르지 않은 이메일 형식입니다: {0}")]
    InvalidEmail(String),
}

impl ServiceError for InquiryError {
    const MAIN_CODE: &'static str = "INQUIRY";

    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn name(&self) -> &'static str {
        match self {
            InquiryError::InvalidContent => "INVALIDCONTENT",
            InquiryError::InvalidEmail(_) => "INVALIDEMAIL",
        }
    }
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("대화방을 찾을 수 없습니다. conversationId: {0}")]
    ConversationNotFound(Uuid),

    #[error("{0}")]
    InferenceError(String),
}

impl ServiceError for AssistantError {
    const MAIN_CODE: &'static str = "ASSISTANT";

    fn status(&self) -> StatusCode {
        match self {
            AssistantError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
            AssistantError::InferenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AssistantError::ConversationNotFound(_) => "CONVERSATIONNOTFOUND",
            AssistantError::InferenceError(_) => "INFERENCEERROR",
        }
    }
}

// ============================================================================
// Application error
// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Inquiry(#[from] InquiryError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Common(CommonError::InvalidRequest(errors.to_string()))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::invalid_request(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        AppError::invalid_request(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        AppError::invalid_request(rejection.body_text())
    }
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::Common(CommonError::InvalidRequest(message.into()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Common(CommonError::InternalServerError(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Common(e) => e.status(),
            AppError::Auth(e) => e.status(),
            AppError::Goal(e) => e.status(),
            AppError::Schedule(e) => e.status(),
            AppError::Notification(e) => e.status(),
            AppError::Image(e) => e.status(),
            AppError::Inquiry(e) => e.status(),
            AppError::Assistant(e) => e.status(),
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Json(_) | AppError::Io(_) | AppError::HttpClient(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> String {
        match self {
            AppError::Common(e) => e.error_code(),
            AppError::Auth(e) => e.error_code(),
            AppError::Goal(e) => e.error_code(),
            AppError::Schedule(e) => e.error_code(),
            AppError::Notification(e) => e.error_code(),
            AppError::Image(e) => e.error_code(),
            AppError::Inquiry(e) => e.error_code(),
            AppError::Assistant(e) => e.error_code(),
            AppError::Jwt(_) => AuthError::InvalidAccessToken.error_code(),
            AppError::Database(_) | AppError::Json(_) | AppError::Io(_) | AppError::HttpClient(_) => {
                CommonError::InternalServerError(String::new()).error_code()
            }
        }
    }

    /// Message safe to hand back to clients
    fn public_message(&self) -> String {
        match self {
            AppError::Jwt(_) => AuthError::InvalidAccessToken.to_string(),
            AppError::Database(_) | AppError::Json(_) | AppError::Io(_) | AppError::HttpClient(_) => {
                CommonError::InternalServerError(String::new()).to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Json(e) => tracing::error!("JSON error: {}", e),
            AppError::Io(e) => tracing::error!("IO error: {}", e),
            AppError::HttpClient(e) => tracing::error!("HTTP client error: {}", e),
            AppError::Common(CommonError::InternalServerError(detail)) => {
                tracing::error!("Internal server error: {}", detail)
            }
            AppError::Assistant(AssistantError::InferenceError(detail)) => {
                tracing::error!("Inference error: {}", detail)
            }
            _ => {}
        }

        ServiceResponse::<()>::from_error(self.status(), self.public_message(), self.error_code())
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
