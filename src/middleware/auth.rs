//! Authentication middleware for protected API routes
//!
//! Reads the access token from a Bearer header or the `ACCESS_TOKEN` cookie.
//! When that fails, a valid `REFRESH_TOKEN` cookie rotates the session and the
//! new cookies ride along on the response.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AuthError};
use crate::models::user;
use crate::services::cookie::{append_cookies, read_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Outcome of resolving the caller
enum Resolved {
    User(user::Model),
    /// Authenticated through the refresh cookie; carries replacement cookies
    Refreshed(user::Model, [String; 2]),
    /// Refresh cookie was present but rejected
    Rejected,
    Anonymous,
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let credentials = Credentials::from_headers(req.headers());
    match resolve(&state, credentials).await {
        Resolved::User(found) => {
            req.extensions_mut().insert(AuthenticatedUser(found));
            next.run(req).await
        }
        Resolved::Refreshed(found, cookies) => {
            req.extensions_mut().insert(AuthenticatedUser(found));
            let mut response = next.run(req).await;
            append_cookies(response.headers_mut(), cookies);
            response
        }
        Resolved::Rejected => {
            let mut response = AppError::from(AuthError::Unauthorized).into_response();
            append_cookies(response.headers_mut(), state.cookies.expired_token_cookies());
            response
        }
        Resolved::Anonymous => AppError::from(AuthError::Unauthorized).into_response(),
    }
}

/// Token strings copied out of the request before any await
struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Credentials {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            access_token: access_token(headers),
            refresh_token: read_cookie(headers, REFRESH_TOKEN_COOKIE),
        }
    }
}

async fn resolve(state: &AppState, credentials: Credentials) -> Resolved {
    if let Some(token) = credentials.access_token {
        match user_from_access_token(state, &token).await {
            Ok(Some(found)) => return Resolved::User(found),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Access token rejected"),
        }
    }

    let Some(refresh_token) = credentials.refresh_token else {
        return Resolved::Anonymous;
    };

    match refresh(state, &refresh_token).await {
        Ok(Some(resolved)) => resolved,
        Ok(None) => Resolved::Rejected,
        Err(e) => {
            tracing::debug!(error = %e, "Refresh token rejected");
            Resolved::Rejected
        }
    }
}

/// Bearer header first, then the cookie
fn access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE))
}

async fn user_from_access_token(state: &AppState, token: &str) -> crate::error::Result<Option<user::Model>> {
    let claims = state.tokens.decode_access_token(token)?;
    let Some(user_id) = claims.user_id() else {
        return Ok(None);
    };
    state.users.find_active(user_id).await
}

async fn refresh(state: &AppState, token: &str) -> crate::error::Result<Option<Resolved>> {
    let user_id = state.tokens.validate_refresh_token(token).await?;
    let Some(found) = state.users.find_active(user_id).await? else {
        return Ok(None);
    };

    let tokens = state.tokens.create_token_group(&found).await?;
    let cookies = state.cookies.token_cookies(
        &tokens,
        state.tokens.access_token_ttl(),
        state.tokens.refresh_token_ttl(),
    );

    tracing::debug!(user_id = %found.id, "Session refreshed from cookie");
    Ok(Some(Resolved::Refreshed(found, cookies)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    fn assert_send<T: Send>(_: &T) {}

    // Compiles only while the middleware future stays Send, which from_fn_with_state requires
    #[allow(dead_code)]
    fn require_auth_future_is_send(state: AppState, req: Request, next: Next) {
        let future = require_auth(State(state), req, next);
        assert_send(&future);
    }

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("ACCESS_TOKEN=cookie-token; REFRESH_TOKEN=refresh-token"),
        );

        let credentials = Credentials::from_headers(&headers);
        assert_eq!(credentials.access_token.as_deref(), Some("header-token"));
        assert_eq!(credentials.refresh_token.as_deref(), Some("refresh-token"));
    }

    #[test]
    fn test_cookie_used_without_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        headers.insert(COOKIE, HeaderValue::from_static("ACCESS_TOKEN=cookie-token"));

        let credentials = Credentials::from_headers(&headers);
        assert_eq!(credentials.access_token.as_deref(), Some("cookie-token"));
        assert!(credentials.refresh_token.is_none());
    }
}
