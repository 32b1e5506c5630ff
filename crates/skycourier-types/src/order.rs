//! order type and its lifecycle states.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// unique identifier for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// a wgs-84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// latitude in degrees.
    pub lat: f64,
    /// longitude in degrees.
    pub lng: f64,
}

impl Coordinates {
    /// create a coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// lifecycle state of an order.
///
/// `delivered`, `failed` and `withdrawn` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// submitted by an end user, waiting for a drone.
    Placed,
    /// handed off from a broken drone, waiting to be picked up again.
    ToPickUp,
    /// carried by a drone towards the destination.
    EnRoute,
    /// dropped off at the destination.
    Delivered,
    /// completion attempt reported unsuccessful.
    Failed,
    /// withdrawn by the submitting user.
    Withdrawn,
}

impl OrderStatus {
    /// the stored string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::ToPickUp => "to_pick_up",
            OrderStatus::EnRoute => "en_route",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
            OrderStatus::Withdrawn => "withdrawn",
        }
    }

    /// parse a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "placed" => Some(OrderStatus::Placed),
            "to_pick_up" => Some(OrderStatus::ToPickUp),
            "en_route" => Some(OrderStatus::EnRoute),
            "delivered" => Some(OrderStatus::Delivered),
            "failed" => Some(OrderStatus::Failed),
            "withdrawn" => Some(OrderStatus::Withdrawn),
            _ => None,
        }
    }

    /// whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Failed | OrderStatus::Withdrawn
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a delivery order.
///
/// orders carry an origin and destination; a pickup location appears only
/// after a broken-drone handoff and persists until the order reaches a
/// terminal state. `drone_path` is the append-only comma-separated list of
/// drone ids that have ever been assigned this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// unique identifier.
    pub id: OrderId,

    /// pickup origin.
    pub origin: Coordinates,

    /// drop-off destination.
    pub destination: Coordinates,

    /// lifecycle state.
    pub status: OrderStatus,

    /// server-assigned placement timestamp, as stored. together with `id`
    /// this forms the total order used for listing and selection.
    pub placement_at: String,

    /// id of the submitting user.
    pub submitted_by: UserId,

    /// handoff pickup location, present iff the order was handed off.
    pub pickup: Option<Coordinates>,

    /// comma-separated drone ids that have handled this order, oldest first.
    pub drone_path: String,
}

impl Order {
    /// the point a drone must reach to grab this order: the handoff pickup
    /// location for a `to_pick_up` order when set, the origin otherwise.
    pub fn pickup_target(&self) -> Coordinates {
        match (self.status, self.pickup) {
            (OrderStatus::ToPickUp, Some(p)) => p,
            _ => self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(status: OrderStatus, pickup: Option<Coordinates>) -> Order {
        Order {
            id: OrderId(1),
            origin: Coordinates::new(0.0, 0.0),
            destination: Coordinates::new(1.0, 1.0),
            status,
            placement_at: "2026-01-01 00:00:00".to_string(),
            submitted_by: UserId(1),
            pickup,
            drone_path: String::new(),
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            OrderStatus::Placed,
            OrderStatus::ToPickUp,
            OrderStatus::EnRoute,
            OrderStatus::Delivered,
            OrderStatus::Failed,
            OrderStatus::Withdrawn,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("reserved"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Withdrawn.is_terminal());
        assert!(!OrderStatus::Placed.is_terminal());
        assert!(!OrderStatus::ToPickUp.is_terminal());
        assert!(!OrderStatus::EnRoute.is_terminal());
    }

    #[test]
    fn test_pickup_target_prefers_handoff_location() {
        let handoff = Coordinates::new(0.5, 0.5);
        let order = sample_order(OrderStatus::ToPickUp, Some(handoff));
        assert_eq!(order.pickup_target(), handoff);
    }

    #[test]
    fn test_pickup_target_falls_back_to_origin() {
        // a to_pick_up order without stored pickup coordinates still resolves
        let order = sample_order(OrderStatus::ToPickUp, None);
        assert_eq!(order.pickup_target(), order.origin);

        let order = sample_order(OrderStatus::Placed, Some(Coordinates::new(0.5, 0.5)));
        assert_eq!(order.pickup_target(), order.origin);
    }
}
