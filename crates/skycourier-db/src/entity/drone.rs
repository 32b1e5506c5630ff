//! drone entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::warn;

use skycourier_types::{Coordinates, Drone, DroneId, DroneStatus, OrderId};

/// drone database model.
///
/// `assigned_job` is nullable but unique when set, which enforces the
/// one-order-per-drone and one-drone-per-order invariants in storage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "drones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    #[sea_orm(unique)]
    pub serial_number: String,

    pub lat: f64,
    pub lng: f64,
    pub speed_mph: f64,

    #[sea_orm(unique)]
    pub assigned_job: Option<i64>,

    /// drone status as string, constrained by a db check.
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::AssignedJob",
        to = "super::order::Column::Id"
    )]
    AssignedOrder,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Drone {
    fn from(model: Model) -> Self {
        let status = DroneStatus::parse(&model.status).unwrap_or_else(|| {
            warn!(drone_id = model.id, status = %model.status, "unknown drone status in storage, treating as fixed");
            DroneStatus::Fixed
        });

        Drone {
            id: DroneId(model.id),
            name: model.name,
            serial_number: model.serial_number,
            location: Coordinates::new(model.lat, model.lng),
            speed_mph: model.speed_mph,
            assigned_job: model.assigned_job.map(OrderId),
            status,
        }
    }
}

impl From<&Drone> for ActiveModel {
    fn from(drone: &Drone) -> Self {
        ActiveModel {
            id: if drone.id.0 == 0 {
                NotSet
            } else {
                Set(drone.id.0)
            },
            name: Set(drone.name.clone()),
            serial_number: Set(drone.serial_number.clone()),
            lat: Set(drone.location.lat),
            lng: Set(drone.location.lng),
            speed_mph: Set(drone.speed_mph),
            assigned_job: Set(drone.assigned_job.map(|id| id.0)),
            status: Set(drone.status.as_str().to_string()),
        }
    }
}
