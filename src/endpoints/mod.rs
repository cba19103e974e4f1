pub mod assistant;
pub mod auth;
pub mod conversations;
pub mod goals;
pub mod images;
pub mod inquiries;
pub mod notifications;
pub mod schedules;
pub mod users;

use axum::{http::Uri, middleware as axum_middleware, Router};
use tower_http::services::ServeDir;

use crate::error::{AppError, CommonError};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let upload_dir = state.images.config().upload_dir.clone();

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .merge(auth::oauth2_routes(state.clone()))
        .nest_service("/uploads/images", ServeDir::new(upload_dir));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api/auth", auth::auth_routes(state.clone()))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes
        .merge(protected_routes)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
}

/// API routes under /api/v1/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest("/chat", assistant::assistant_routes(state.clone()))
        .nest(
            "/conversations",
            conversations::conversations_routes(state.clone()),
        )
        .nest(
            "/goals",
            goals::goals_routes(state.clone()).merge(schedules::schedules_routes(state.clone())),
        )
        .nest(
            "/notifications",
            notifications::notifications_routes(state.clone()),
        )
        .nest("/images", images::images_routes(state.clone()))
        .nest("/inquiries", inquiries::inquiries_routes(state.clone()))
        .merge(users::users_routes(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> AppError {
    CommonError::NoResourceFound(uri.path().to_string()).into()
}

async fn method_not_allowed() -> AppError {
    CommonError::InvalidMethod.into()
}
