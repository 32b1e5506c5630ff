//! database migrations for skycourier.

use sea_orm_migration::prelude::*;

mod m20260115_000001_create_users;
mod m20260115_000002_create_orders;
mod m20260115_000003_create_drones;

/// the skycourier migrator.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260115_000001_create_users::Migration),
            Box::new(m20260115_000002_create_orders::Migration),
            Box::new(m20260115_000003_create_drones::Migration),
        ]
    }
}
