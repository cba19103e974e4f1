//! Application bootstrapper
//!
//! Handles all initialization and setup for the AiMinder backend.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::db;
use crate::endpoints;
use crate::services::assistant::OpenAiChatModel;
use crate::services::notification::NotificationListener;
use crate::services::scheduler::{self, FeedbackTask};
use crate::services::NotificationPublisher;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting AiMinder backend v{}", env!("CARGO_PKG_VERSION"));

    let state = init_services(&CONFIG).await?;

    scheduler::start_scheduler(vec![Box::new(FeedbackTask::new(
        state.users.clone(),
        state.goals.clone(),
        state.feedback.clone(),
    ))]);

    let app = create_app(state, &CONFIG);

    serve(app, &CONFIG).await
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("aiminder={},tower_http=info", CONFIG.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Connect the database, wire the notification bus and build the shared state
async fn init_services(config: &Config) -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    if config.assistant.api_key.is_empty() {
        tracing::warn!("AIMINDER_OPENAI_API_KEY not set, assistant requests will fail");
    }
    let model = Arc::new(OpenAiChatModel::new(&config.assistant)?);

    let (publisher, rx) = NotificationPublisher::channel();
    let state = AppState::new(conn, config, model, publisher);

    NotificationListener::spawn(state.notifications.clone(), rx);
    tracing::info!("Notification listener started");

    Ok(state)
}

/// Create the main application router
pub fn create_app(state: AppState, config: &Config) -> Router {
    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.allowed_origins))
}

/// Any origin when none are configured. Cookie credentials need an explicit list.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Start the HTTP server
async fn serve(app: Router, config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
