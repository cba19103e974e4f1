//! Migration: Create inquiries and user_withdrawals tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inquiries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inquiries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Inquiries::UserId).uuid().not_null())
                    .col(ColumnDef::new(Inquiries::InquiryType).string_len(32).not_null())
                    .col(ColumnDef::new(Inquiries::Content).text().not_null())
                    .col(ColumnDef::new(Inquiries::ContactEmail).string().null())
                    .col(
                        ColumnDef::new(Inquiries::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Inquiries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inquiries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Withdrawn users are soft-deleted, so no FK here
        manager
            .create_table(
                Table::create()
                    .table(UserWithdrawals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserWithdrawals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserWithdrawals::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserWithdrawals::Reason).string_len(32).not_null())
                    .col(
                        ColumnDef::new(UserWithdrawals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserWithdrawals::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inquiries::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum Inquiries {
    Table,
    Id,
    UserId,
    InquiryType,
    Content,
    ContactEmail,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserWithdrawals {
    Table,
    Id,
    UserId,
    Reason,
    CreatedAt,
}
