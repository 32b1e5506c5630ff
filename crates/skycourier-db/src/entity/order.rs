//! order entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use tracing::warn;

use skycourier_types::{Coordinates, Order, OrderId, OrderStatus, UserId};

/// order database model.
///
/// `placement_at` is text with a `CURRENT_TIMESTAMP` default so the value is
/// generated by the database on insert and read back afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub origin_lat: f64,
    pub origin_lng: f64,
    pub dest_lat: f64,
    pub dest_lng: f64,

    /// order status as string, constrained by a db check.
    pub status: String,

    /// server-assigned placement timestamp, as stored.
    pub placement_at: String,

    pub submitted_by: i64,

    /// handoff pickup location; both set or both null.
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,

    /// comma-separated drone ids, oldest first.
    pub drone_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmittedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        let status = OrderStatus::parse(&model.status).unwrap_or_else(|| {
            warn!(order_id = model.id, status = %model.status, "unknown order status in storage, treating as placed");
            OrderStatus::Placed
        });

        let pickup = match (model.pickup_lat, model.pickup_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        Order {
            id: OrderId(model.id),
            origin: Coordinates::new(model.origin_lat, model.origin_lng),
            destination: Coordinates::new(model.dest_lat, model.dest_lng),
            status,
            placement_at: model.placement_at,
            submitted_by: UserId(model.submitted_by),
            pickup,
            drone_path: model.drone_path.unwrap_or_default(),
        }
    }
}

impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        ActiveModel {
            id: if order.id.0 == 0 {
                NotSet
            } else {
                Set(order.id.0)
            },
            origin_lat: Set(order.origin.lat),
            origin_lng: Set(order.origin.lng),
            dest_lat: Set(order.destination.lat),
            dest_lng: Set(order.destination.lng),
            status: Set(order.status.as_str().to_string()),
            // leave unset on insert so the db default stamps it
            placement_at: if order.placement_at.is_empty() {
                NotSet
            } else {
                Set(order.placement_at.clone())
            },
            submitted_by: Set(order.submitted_by.0),
            pickup_lat: Set(order.pickup.map(|p| p.lat)),
            pickup_lng: Set(order.pickup.map(|p| p.lng)),
            drone_path: if order.drone_path.is_empty() {
                Set(None)
            } else {
                Set(Some(order.drone_path.clone()))
            },
        }
    }
}
