//! Migration: Create goals and schedules tables

use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Goals::UserId).uuid().not_null())
                    .col(ColumnDef::new(Goals::Title).string().not_null())
                    .col(ColumnDef::new(Goals::Description).text().null())
                    .col(ColumnDef::new(Goals::TargetDate).date().not_null())
                    .col(
                        ColumnDef::new(Goals::IsAiGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Goals::Status)
                            .string_len(16)
                            .not_null()
                            .default("READY"),
                    )
                    .col(ColumnDef::new(Goals::ImageId).uuid().null())
                    .col(
                        ColumnDef::new(Goals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Goals::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goals_user")
                            .from(Goals::Table, Goals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_goals_user_id")
                    .table(Goals::Table)
                    .col(Goals::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Schedules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Schedules::GoalId).uuid().not_null())
                    .col(ColumnDef::new(Schedules::UserId).uuid().not_null())
                    .col(ColumnDef::new(Schedules::Title).string().not_null())
                    .col(ColumnDef::new(Schedules::Description).text().null())
                    .col(
                        ColumnDef::new(Schedules::Status)
                            .string_len(16)
                            .not_null()
                            .default("READY"),
                    )
                    .col(
                        ColumnDef::new(Schedules::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Schedules::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedules_goal")
                            .from(Schedules::Table, Schedules::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedules_user_start")
                    .table(Schedules::Table)
                    .col(Schedules::UserId)
                    .col(Schedules::StartDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedules::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    UserId,
    Title,
    Description,
    TargetDate,
    IsAiGenerated,
    Status,
    ImageId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Schedules {
    Table,
    Id,
    GoalId,
    UserId,
    Title,
    Description,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
