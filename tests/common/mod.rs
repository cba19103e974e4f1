//! Shared setup for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tower::util::ServiceExt;
use uuid::Uuid;

use aiminder::config::auth::OAuthClientConfig;
use aiminder::config::Config;
use aiminder::endpoints::create_router;
use aiminder::migrations::Migrator;
use aiminder::models::goal::{self, GoalStatus};
use aiminder::models::user::{self, OAuth2Provider};
use aiminder::services::assistant::{ChatCompletion, ChatModel, ToolCall};
use aiminder::services::notification::NotificationEvent;
use aiminder::services::NotificationPublisher;
use aiminder::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

pub async fn create_test_user(db: &DatabaseConnection, provider_id: &str) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        provider: Set(OAuth2Provider::Google),
        provider_id: Set(provider_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert test user")
}

pub async fn create_test_goal(db: &DatabaseConnection, user_id: Uuid, title: &str) -> goal::Model {
    let now = Utc::now();
    goal::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set(title.to_string()),
        description: Set(None),
        target_date: Set(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
        is_ai_generated: Set(false),
        status: Set(GoalStatus::Active),
        image_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert test goal")
}

// ============================================================================
// Scripted model
// ============================================================================

/// Replays queued completions in order and records every request it sees
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ChatCompletion>>,
    requests: Mutex<Vec<Vec<Value>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ChatCompletion>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(vec![]),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Vec<Value> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: &[Value], _tools: &[Value]) -> anyhow::Result<ChatCompletion> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
    }
}

/// Final answer in the structured output format
pub fn text_reply(message: &str) -> ChatCompletion {
    ChatCompletion::text(
        json!({"responses": [{"type": "TEXT", "messages": [message]}]}).to_string(),
    )
}

pub fn tool_reply(id: &str, name: &str, arguments: Value) -> ChatCompletion {
    ChatCompletion {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
    }
}

// ============================================================================
// App state
// ============================================================================

pub fn test_config() -> Config {
    let mut config = Config::from_env();
    config.image.upload_dir = std::env::temp_dir().join(format!("aiminder-it-{}", Uuid::new_v4()));
    config.auth.oauth.allowed_redirect_hosts = vec!["localhost".to_string()];
    config.auth.oauth.client_url = "http://localhost:3000".to_string();
    config.auth.oauth.default_redirect_url = String::new();
    config.auth.oauth.error_url = "http://localhost:3000/login?error=oauth".to_string();
    config.auth.oauth.google = Some(OAuthClientConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
    });
    config.auth.oauth.kakao = None;
    config.assistant.max_tool_rounds = 3;
    config
}

/// State plus the receiving end of the notification bus
pub fn build_app_state_with_bus(
    db: DatabaseConnection,
    model: Arc<dyn ChatModel>,
) -> (AppState, UnboundedReceiver<NotificationEvent>) {
    let (publisher, rx) = NotificationPublisher::channel();
    let state = AppState::new(db, &test_config(), model, publisher);
    (state, rx)
}

pub fn build_app_state(db: DatabaseConnection) -> AppState {
    build_app_state_with_bus(db, ScriptedModel::new(vec![])).0
}

pub async fn bearer_for(state: &AppState, user: &user::Model) -> String {
    let tokens = state.tokens.create_token_group(user).await.unwrap();
    format!("Bearer {}", tokens.access_token)
}

// ============================================================================
// HTTP
// ============================================================================

pub async fn send(app: Router, request: Request<Body>) -> (Response<Body>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (Response::from_parts(parts, Body::empty()), json)
}

pub fn authed(method: &str, uri: &str, bearer: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", bearer);
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn app(state: AppState) -> Router {
    create_router(state)
}
