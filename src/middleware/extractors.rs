//! Extractors that report failures through the service envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query},
    http::request::Parts,
    Json,
};

use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::models::user;

/// Extractor for any authenticated user
///
/// Requires `require_auth` on the route.
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AuthError::Unauthorized)?;

        Ok(Authenticated(auth_user.0.clone()))
    }
}

/// `Json` with malformed bodies mapped to `COMMON:INVALIDREQUEST`
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` with malformed parameters mapped to `COMMON:INVALIDREQUEST`
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` with malformed segments mapped to `COMMON:INVALIDREQUEST`
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
