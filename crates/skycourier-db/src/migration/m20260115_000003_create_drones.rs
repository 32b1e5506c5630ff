//! create drones table migration

use sea_orm_migration::prelude::*;

use super::m20260115_000002_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drones::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drones::Name).string().not_null())
                    .col(
                        ColumnDef::new(Drones::SerialNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Drones::Lat).double().not_null().default(0.0))
                    .col(ColumnDef::new(Drones::Lng).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Drones::SpeedMph)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    // nullable but unique when set: at most one drone per order
                    .col(
                        ColumnDef::new(Drones::AssignedJob)
                            .big_integer()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Drones::Status)
                            .string()
                            .not_null()
                            .default("fixed")
                            .check(Expr::col(Drones::Status).is_in(["fixed", "broken"])),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_drones_assigned_job")
                            .from(Drones::Table, Drones::AssignedJob)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Drones::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Drones {
    Table,
    Id,
    Name,
    SerialNumber,
    Lat,
    Lng,
    SpeedMph,
    AssignedJob,
    Status,
}
