//! Test helpers for unit tests inside the crate.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use crate::config::image::{ImageConfig, DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_FILE_SIZE};
use crate::config::parse_list;
use crate::migrations::Migrator;
use crate::models::user::{self, OAuth2Provider};
use crate::services::ImageService;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // A single pooled connection keeps the in-memory database alive
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

pub async fn insert_user(
    db: &DatabaseConnection,
    provider: OAuth2Provider,
    provider_id: &str,
) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        provider: Set(provider),
        provider_id: Set(provider_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to insert test user")
}

/// Image service writing under a throwaway directory in the system temp dir
pub fn image_service(db: DatabaseConnection) -> ImageService {
    ImageService::new(
        db,
        ImageConfig {
            upload_dir: std::env::temp_dir().join(format!("aiminder-test-{}", Uuid::new_v4())),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: parse_list(DEFAULT_ALLOWED_TYPES),
        },
    )
}
