//! OAuth2 login flow and session endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::error::{AppError, AuthError, Result};
use crate::middleware::{AppPath, AppQuery, Authenticated};
use crate::models::user::OAuth2Provider;
use crate::schemas::common::ServiceResponse;
use crate::schemas::user::GetUserResponse;
use crate::services::cookie::{
    append_cookies, read_cookie, REFRESH_TOKEN_COOKIE, RETURN_TO_COOKIE, RETURN_TO_MAX_AGE,
    STATE_COOKIE, STATE_MAX_AGE,
};
use crate::services::oauth2::generate_random_string;
use crate::services::token::TokenGroup;
use crate::state::AppState;

/// Public login routes
pub fn oauth2_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/oauth2/authorization/{provider}", get(authorize))
        .route("/api/login/oauth2/code/{provider}", get(callback))
        .route("/api/auth/refresh", post(refresh))
        .with_state(state)
}

/// Session routes behind the auth middleware
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/user", get(get_user))
        .with_state(state)
}

fn parse_provider(raw: &str) -> Result<OAuth2Provider> {
    OAuth2Provider::parse(raw)
        .ok_or_else(|| AppError::invalid_request(format!("지원하지 않는 로그인 제공자입니다: {}", raw)))
}

/// 302 to `location` with the given cookies
fn found(location: &str, cookies: Vec<String>) -> Response {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(e) => {
            tracing::error!(location, error = %e, "Invalid redirect location");
            return AppError::internal("Invalid redirect location").into_response();
        }
    }
    append_cookies(&mut headers, cookies);
    (StatusCode::FOUND, headers).into_response()
}

// ============================================================================
// Authorization
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorizeQuery {
    pub return_to: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/oauth2/authorization/{provider}",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "google or kakao"),
        AuthorizeQuery
    ),
    responses(
        (status = 302, description = "Redirect to the provider consent page")
    )
)]
async fn authorize(
    State(state): State<AppState>,
    AppPath(provider): AppPath<String>,
    AppQuery(query): AppQuery<AuthorizeQuery>,
) -> Result<Response> {
    let provider = parse_provider(&provider)?;
    let oauth_state = generate_random_string(32);
    let location = state.oauth.authorization_url(provider, &oauth_state)?;

    let mut cookies = vec![state.cookies.build(STATE_COOKIE, &oauth_state, STATE_MAX_AGE)];
    match query.return_to.as_deref() {
        Some(target) if state.redirects.is_allowed(Some(target)) => {
            cookies.push(state.cookies.build(
                RETURN_TO_COOKIE,
                &urlencoding::encode(target),
                RETURN_TO_MAX_AGE,
            ));
        }
        Some(target) => {
            tracing::warn!(return_to = target, "Ignoring return_to outside the allow-list");
        }
        None => {}
    }

    Ok(found(&location, cookies))
}

// ============================================================================
// Callback
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/login/oauth2/code/{provider}",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "google or kakao"),
        CallbackQuery
    ),
    responses(
        (status = 302, description = "Redirect to the client with session cookies, or to the error page")
    )
)]
async fn callback(
    State(state): State<AppState>,
    AppPath(provider): AppPath<String>,
    AppQuery(query): AppQuery<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let cleanup = vec![
        state.cookies.expire(RETURN_TO_COOKIE),
        state.cookies.expire(STATE_COOKIE),
    ];

    match complete_login(&state, &provider, &query, &headers).await {
        Ok(mut cookies) => {
            let location = return_target(&state, &headers);
            cookies.extend(cleanup);
            found(&location, cookies)
        }
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "OAuth2 login failed");
            found(&state.oauth.config().error_url, cleanup)
        }
    }
}

/// Returns the token cookies to set
async fn complete_login(
    state: &AppState,
    provider: &str,
    query: &CallbackQuery,
    headers: &HeaderMap,
) -> Result<Vec<String>> {
    if let Some(error) = &query.error {
        return Err(AppError::invalid_request(format!("Provider returned error: {}", error)));
    }
    let provider = parse_provider(provider)?;

    let expected = read_cookie(headers, STATE_COOKIE);
    if expected.is_none() || expected != query.state {
        return Err(AppError::invalid_request("OAuth2 state mismatch"));
    }
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::invalid_request("Missing authorization code"))?;

    let provider_id = state.oauth.fetch_provider_id(provider, code).await?;
    let user = state.users.find_or_create(provider, &provider_id).await?;
    let tokens = state.tokens.create_token_group(&user).await?;

    tracing::info!(user_id = %user.id, provider = %provider, "User logged in");
    Ok(state
        .cookies
        .token_cookies(
            &tokens,
            state.tokens.access_token_ttl(),
            state.tokens.refresh_token_ttl(),
        )
        .to_vec())
}

/// Stored return_to target when still allowed, else the default landing page
fn return_target(state: &AppState, headers: &HeaderMap) -> String {
    read_cookie(headers, RETURN_TO_COOKIE)
        .and_then(|raw| urlencoding::decode(&raw).ok().map(|s| s.into_owned()))
        .filter(|target| state.redirects.is_allowed(Some(target)))
        .unwrap_or_else(|| state.oauth.config().default_redirect())
}

// ============================================================================
// Refresh / Logout / Current user
// ============================================================================

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, body = TokenGroup),
        (status = 401, description = "Invalid refresh token")
    )
)]
async fn refresh(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Response> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| AppError::invalid_request(e.to_string()))?
            .refresh_token
    };
    let token = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .or(from_body)
        .ok_or(AuthError::InvalidRefreshToken)?;

    let user_id = state.tokens.validate_refresh_token(&token).await?;
    let user = state
        .users
        .find_active(user_id)
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;
    let tokens = state.tokens.create_token_group(&user).await?;

    let cookies = state.cookies.token_cookies(
        &tokens,
        state.tokens.access_token_ttl(),
        state.tokens.refresh_token_ttl(),
    );
    let mut response = ServiceResponse::from_data(tokens).into_response();
    append_cookies(response.headers_mut(), cookies);
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out")
    )
)]
async fn logout(State(state): State<AppState>, auth: Authenticated) -> Result<Response> {
    state.tokens.delete_refresh_token(auth.0.id).await?;

    let mut response = ServiceResponse::<()>::from_message("로그아웃되었습니다.").into_response();
    append_cookies(response.headers_mut(), state.cookies.expired_token_cookies());
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    responses(
        (status = 200, body = GetUserResponse)
    )
)]
async fn get_user(auth: Authenticated) -> ServiceResponse<GetUserResponse> {
    ServiceResponse::from_data(GetUserResponse { id: auth.0.id })
}
