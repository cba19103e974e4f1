pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users;
mod m20250901_000002_create_goals;
mod m20250901_000003_create_conversations;
mod m20250901_000004_create_notifications;
mod m20250901_000005_create_images;
mod m20250901_000006_create_inquiries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users::Migration),
            Box::new(m20250901_000002_create_goals::Migration),
            Box::new(m20250901_000003_create_conversations::Migration),
            Box::new(m20250901_000004_create_notifications::Migration),
            Box::new(m20250901_000005_create_images::Migration),
            Box::new(m20250901_000006_create_inquiries::Migration),
        ]
    }
}
