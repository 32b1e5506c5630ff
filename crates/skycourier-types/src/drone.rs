//! drone type and its health states.

use serde::{Deserialize, Serialize};

use crate::{Coordinates, OrderId};

/// unique identifier for a drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroneId(pub i64);

impl From<i64> for DroneId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DroneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// health status of a drone.
///
/// `broken` drones cannot reserve orders until an admin flips them back to
/// `fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    /// operational.
    #[default]
    Fixed,
    /// out of service; awaiting admin repair.
    Broken,
}

impl DroneStatus {
    /// the stored string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DroneStatus::Fixed => "fixed",
            DroneStatus::Broken => "broken",
        }
    }

    /// parse a stored status string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(DroneStatus::Fixed),
            "broken" => Some(DroneStatus::Broken),
            _ => None,
        }
    }
}

impl std::fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a delivery drone.
///
/// location and speed reflect the last heartbeat. `assigned_job` pairs the
/// drone with at most one order and is unique across the fleet when set,
/// which is what makes double-booking impossible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    /// unique identifier.
    pub id: DroneId,

    /// display name; not unique.
    pub name: String,

    /// unique serial number, the preferred principal name for drone callers.
    pub serial_number: String,

    /// last reported location.
    pub location: Coordinates,

    /// last reported ground speed in miles per hour.
    pub speed_mph: f64,

    /// currently assigned order, if any.
    pub assigned_job: Option<OrderId>,

    /// health status.
    pub status: DroneStatus,
}

impl Drone {
    /// create a new fixed, unassigned drone at the given location.
    pub fn new(id: DroneId, name: String, serial_number: String, location: Coordinates) -> Self {
        Self {
            id,
            name,
            serial_number,
            location,
            speed_mph: 0.0,
            assigned_job: None,
            status: DroneStatus::Fixed,
        }
    }
}
