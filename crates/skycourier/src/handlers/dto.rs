//! shared api representations of domain entities.

use serde::{Deserialize, Serialize};

use skycourier_types::{Coordinates, Drone, Order, OrderStatus};

/// order representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub status: OrderStatus,
    pub placement_at: String,
    pub submitted_by: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<Coordinates>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.0,
            origin: order.origin,
            destination: order.destination,
            status: order.status,
            placement_at: order.placement_at,
            submitted_by: order.submitted_by.0,
            pickup: order.pickup,
        }
    }
}

/// drone representation in api responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct DroneResponse {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub location: Coordinates,
    pub speed_mph: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_job: Option<i64>,
    pub status: skycourier_types::DroneStatus,
}

impl From<Drone> for DroneResponse {
    fn from(drone: Drone) -> Self {
        Self {
            id: drone.id.0,
            name: drone.name,
            serial_number: drone.serial_number,
            location: drone.location,
            speed_mph: drone.speed_mph,
            assigned_job: drone.assigned_job.map(|id| id.0),
            status: drone.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycourier_types::{DroneId, DroneStatus, OrderId, UserId};

    #[test]
    fn test_order_response_serialization() {
        let order = Order {
            id: OrderId(7),
            origin: Coordinates::new(0.0, 0.0),
            destination: Coordinates::new(1.0, 1.0),
            status: OrderStatus::ToPickUp,
            placement_at: "2026-01-01 10:00:00".to_string(),
            submitted_by: UserId(3),
            pickup: Some(Coordinates::new(0.5, 0.5)),
            drone_path: "1,2".to_string(),
        };
        let json = serde_json::to_string(&OrderResponse::from(order)).unwrap();

        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"to_pick_up\""));
        assert!(json.contains("\"pickup\""));
        // the path is internal bookkeeping, never exposed
        assert!(!json.contains("drone_path"));
    }

    #[test]
    fn test_order_response_omits_absent_pickup() {
        let order = Order {
            id: OrderId(1),
            origin: Coordinates::new(0.0, 0.0),
            destination: Coordinates::new(1.0, 1.0),
            status: OrderStatus::Placed,
            placement_at: String::new(),
            submitted_by: UserId(1),
            pickup: None,
            drone_path: String::new(),
        };
        let json = serde_json::to_string(&OrderResponse::from(order)).unwrap();
        assert!(!json.contains("\"pickup\""));
    }

    #[test]
    fn test_drone_response_serialization() {
        let drone = Drone {
            id: DroneId(2),
            name: "hawk".to_string(),
            serial_number: "SN-2".to_string(),
            location: Coordinates::new(1.0, 2.0),
            speed_mph: 30.0,
            assigned_job: Some(OrderId(9)),
            status: DroneStatus::Fixed,
        };
        let json = serde_json::to_string(&DroneResponse::from(drone)).unwrap();
        assert!(json.contains("\"serial_number\":\"SN-2\""));
        assert!(json.contains("\"assigned_job\":9"));
        assert!(json.contains("\"fixed\""));
    }
}
