//! Create member table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Member::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Member::MatricNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Member::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Member::FirstName).string_len(64).not_null())
                    .col(ColumnDef::new(Member::LastName).string_len(64).not_null())
                    .col(ColumnDef::new(Member::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Member::Department).string_len(128).not_null())
                    .col(ColumnDef::new(Member::Level).string_len(16).not_null())
                    .col(ColumnDef::new(Member::Status).string_len(16).not_null().default("PENDING"))
                    .col(
                        ColumnDef::new(Member::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Member::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique indexes close the check-then-insert race on registration
        manager
            .create_index(
                Index::create()
                    .name("idx_member_matric_number")
                    .table(Member::Table)
                    .col(Member::MatricNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_member_email")
                    .table(Member::Table)
                    .col(Member::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status
        manager
            .create_index(
                Index::create()
                    .name("idx_member_status")
                    .table(Member::Table)
                    .col(Member::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Member {
    Table,
    Id,
    MatricNumber,
    Email,
    FirstName,
    LastName,
    Phone,
    Department,
    Level,
    Status,
    CreatedAt,
    UpdatedAt,
}
