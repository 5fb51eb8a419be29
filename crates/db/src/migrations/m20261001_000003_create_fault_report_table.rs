//! Create `fault_report` and `fault_status_history` tables.

use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_user_table::User;
use super::m20261001_000002_create_fault_category_table::FaultCategory;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FaultReport::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FaultReport::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(FaultReport::ReferenceId).string_len(16).not_null())
                    .col(ColumnDef::new(FaultReport::ReporterName).string_len(128).not_null())
                    .col(ColumnDef::new(FaultReport::ReporterEmail).string_len(320).not_null())
                    .col(ColumnDef::new(FaultReport::ReporterPhone).string_len(32))
                    .col(ColumnDef::new(FaultReport::Location).string_len(256).not_null())
                    .col(ColumnDef::new(FaultReport::CategoryId).string_len(32).not_null())
                    .col(ColumnDef::new(FaultReport::Description).text().not_null())
                    .col(ColumnDef::new(FaultReport::AttachmentUrl).string_len(1024))
                    .col(ColumnDef::new(FaultReport::Status).string_len(16).not_null().default("OPEN"))
                    .col(ColumnDef::new(FaultReport::AssignedTo).string_len(32))
                    .col(ColumnDef::new(FaultReport::AdminNotes).text())
                    .col(
                        ColumnDef::new(FaultReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(FaultReport::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fault_report_category")
                            .from(FaultReport::Table, FaultReport::CategoryId)
                            .to(FaultCategory::Table, FaultCategory::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fault_report_assigned_to")
                            .from(FaultReport::Table, FaultReport::AssignedTo)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: reference_id (collision guard for generated codes)
        manager
            .create_index(
                Index::create()
                    .name("idx_fault_report_reference_id")
                    .table(FaultReport::Table)
                    .col(FaultReport::ReferenceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (dashboard counts and filters)
        manager
            .create_index(
                Index::create()
                    .name("idx_fault_report_status")
                    .table(FaultReport::Table)
                    .col(FaultReport::Status)
                    .to_owned(),
            )
            .await?;

        // Index: assigned_to
        manager
            .create_index(
                Index::create()
                    .name("idx_fault_report_assigned_to")
                    .table(FaultReport::Table)
                    .col(FaultReport::AssignedTo)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_fault_report_created_at")
                    .table(FaultReport::Table)
                    .col(FaultReport::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FaultStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FaultStatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FaultStatusHistory::FaultId).string_len(32).not_null())
                    .col(ColumnDef::new(FaultStatusHistory::Status).string_len(16).not_null())
                    .col(ColumnDef::new(FaultStatusHistory::Note).text())
                    .col(ColumnDef::new(FaultStatusHistory::ChangedBy).string_len(32))
                    .col(
                        ColumnDef::new(FaultStatusHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fault_status_history_fault")
                            .from(FaultStatusHistory::Table, FaultStatusHistory::FaultId)
                            .to(FaultReport::Table, FaultReport::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fault_status_history_changed_by")
                            .from(FaultStatusHistory::Table, FaultStatusHistory::ChangedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (fault_id, created_at, id) for timeline reads
        manager
            .create_index(
                Index::create()
                    .name("idx_fault_status_history_timeline")
                    .table(FaultStatusHistory::Table)
                    .col(FaultStatusHistory::FaultId)
                    .col(FaultStatusHistory::CreatedAt)
                    .col(FaultStatusHistory::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FaultStatusHistory::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(FaultReport::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FaultReport {
    Table,
    Id,
    ReferenceId,
    ReporterName,
    ReporterEmail,
    ReporterPhone,
    Location,
    CategoryId,
    Description,
    AttachmentUrl,
    Status,
    AssignedTo,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FaultStatusHistory {
    Table,
    Id,
    FaultId,
    Status,
    Note,
    ChangedBy,
    CreatedAt,
}
