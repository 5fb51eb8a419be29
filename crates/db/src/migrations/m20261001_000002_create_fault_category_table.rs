//! Create `fault_category` table and seed the default taxonomy.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (code, name, description)
const DEFAULT_CATEGORIES: [(&str, &str, &str); 7] = [
    ("electrical", "Electrical", "Lighting, sockets, wiring and power outages"),
    ("plumbing", "Plumbing", "Leaks, blocked drains, taps and toilets"),
    ("carpentry", "Carpentry & Furniture", "Doors, windows, desks and chairs"),
    ("network", "Network & IT", "Wi-Fi, LAN points and shared computers"),
    ("cleaning", "Cleaning & Sanitation", "Waste, pests and hygiene issues"),
    ("security", "Safety & Security", "Locks, fire equipment and hazards"),
    ("other", "Other", "Anything not covered above"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FaultCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FaultCategory::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(FaultCategory::Name).string_len(128).not_null())
                    .col(ColumnDef::new(FaultCategory::Description).text())
                    .col(ColumnDef::new(FaultCategory::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(FaultCategory::DisplayOrder).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(FaultCategory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert();
        insert.into_table(FaultCategory::Table).columns([
            FaultCategory::Id,
            FaultCategory::Name,
            FaultCategory::Description,
            FaultCategory::DisplayOrder,
        ]);
        for (order, (code, name, description)) in (0_i32..).zip(DEFAULT_CATEGORIES) {
            insert.values_panic([code.into(), name.into(), description.into(), order.into()]);
        }
        insert.on_conflict(OnConflict::column(FaultCategory::Id).do_nothing().to_owned());

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FaultCategory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FaultCategory {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    DisplayOrder,
    CreatedAt,
}
