//! create orders table migration

use sea_orm_migration::prelude::*;

use super::m20260115_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::OriginLat).double().not_null())
                    .col(ColumnDef::new(Orders::OriginLng).double().not_null())
                    .col(ColumnDef::new(Orders::DestLat).double().not_null())
                    .col(ColumnDef::new(Orders::DestLng).double().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("placed")
                            .check(Expr::col(Orders::Status).is_in([
                                "placed",
                                "to_pick_up",
                                "en_route",
                                "delivered",
                                "failed",
                                "withdrawn",
                            ])),
                    )
                    .col(
                        ColumnDef::new(Orders::PlacementAt)
                            .text()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Orders::SubmittedBy).big_integer().not_null())
                    .col(ColumnDef::new(Orders::PickupLat).double())
                    .col(ColumnDef::new(Orders::PickupLng).double())
                    .col(ColumnDef::new(Orders::DronePath).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_submitted_by")
                            .from(Orders::Table, Orders::SubmittedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index on submitted_by for per-user listings
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_submitted_by")
                    .table(Orders::Table)
                    .col(Orders::SubmittedBy)
                    .to_owned(),
            )
            .await?;

        // index on status for the reservation query and admin filters
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        // index on placement_at for keyset pagination
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_placement_at")
                    .table(Orders::Table)
                    .col(Orders::PlacementAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    Id,
    OriginLat,
    OriginLng,
    DestLat,
    DestLng,
    Status,
    PlacementAt,
    SubmittedBy,
    PickupLat,
    PickupLng,
    DronePath,
}
