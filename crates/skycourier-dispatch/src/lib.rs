//! dispatch engine for skycourier.
//!
//! this crate drives the order and drone state machines: reservations,
//! geofenced pickups and completions, the broken-drone handoff, and eta
//! derivation. the engine holds no state of its own - every decision reads
//! the current store snapshot and writes back under the store's invariants,
//! so any number of requests can run in parallel with coordination deferred
//! to the database.

#![warn(missing_docs)]

mod error;

pub use error::Error;

use tracing::info;

use skycourier_db::Database;
use skycourier_types::geo::{self, RADIUS_FEET};
use skycourier_types::{Coordinates, Drone, DroneStatus, Order, OrderId, OrderStatus, User};

/// result type for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// seconds per hour, for eta conversion from hours to seconds.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// the stateless dispatch engine.
///
/// generic over the [`Database`] so tests can run it against an in-memory
/// store.
#[derive(Clone)]
pub struct DispatchEngine<D> {
    db: D,
}

impl<D: Database> DispatchEngine<D> {
    /// create an engine over the given store.
    pub fn new(db: D) -> Self {
        Self { db }
    }

    /// resolve the calling drone from its principal name: serial number
    /// first, display name as a fallback.
    pub async fn resolve_drone(&self, principal_name: &str) -> Result<Drone> {
        if let Some(drone) = self.db.get_drone_by_serial(principal_name).await? {
            return Ok(drone);
        }
        if let Some(drone) = self.db.get_drone_by_name(principal_name).await? {
            return Ok(drone);
        }
        Err(Error::NotFound("drone"))
    }

    /// resolve the calling user from its principal name.
    pub async fn resolve_user(&self, username: &str) -> Result<User> {
        self.db
            .get_user_by_username(username)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    // ─── Drone-actor operations ──────────────────────────────────────────────

    /// reserve the next available order for the calling drone.
    ///
    /// the drone must be fixed and unassigned. the order's status is not
    /// advanced here - the unique `assigned_job` column is the sole record of
    /// "currently claimed". losing the write race against another drone
    /// surfaces as [`Error::AssignRace`] for the client to retry.
    pub async fn reserve_order(&self, principal_name: &str) -> Result<Order> {
        let drone = self.resolve_drone(principal_name).await?;

        if drone.status == DroneStatus::Broken {
            return Err(Error::FailedPrecondition("drone is broken".to_string()));
        }
        if drone.assigned_job.is_some() {
            return Err(Error::FailedPrecondition(
                "drone already has an assigned order".to_string(),
            ));
        }

        let Some(order) = self.db.find_next_available_for_reservation(drone.id).await? else {
            return Err(Error::FailedPrecondition(
                "no available orders to reserve".to_string(),
            ));
        };

        match self.db.reserve_with_path(drone.id, order.id).await {
            Err(skycourier_db::Error::AlreadyExists(msg)) => return Err(Error::AssignRace(msg)),
            other => other?,
        }

        info!(drone = %drone.id, order = %order.id, "order reserved");
        self.fetch_order(order.id).await
    }

    /// grab the assigned order: transition it from placed/to_pick_up to
    /// en_route once the drone is inside the pickup geofence.
    pub async fn grab_order(&self, principal_name: &str) -> Result<Order> {
        let drone = self.resolve_drone(principal_name).await?;
        let order = self.assigned_order_or_unassign(&drone).await?;

        if order.status != OrderStatus::Placed && order.status != OrderStatus::ToPickUp {
            return Err(Error::FailedPrecondition(format!(
                "cannot grab order with status {}",
                order.status
            )));
        }

        // handed-off orders are picked up where the broken drone left them
        let target = order.pickup_target();
        if !geo::is_within_radius(drone.location, target, RADIUS_FEET) {
            return Err(Error::FailedPrecondition(
                "not within pickup radius".to_string(),
            ));
        }

        self.db.update_order_status(order.id, OrderStatus::EnRoute).await?;
        info!(drone = %drone.id, order = %order.id, "order grabbed");
        self.fetch_order(order.id).await
    }

    /// complete the assigned order as delivered or failed once the drone is
    /// inside the destination geofence, then release the drone.
    pub async fn complete_order(&self, principal_name: &str, delivered: bool) -> Result<Order> {
        let drone = self.resolve_drone(principal_name).await?;
        let order = self.assigned_order_or_unassign(&drone).await?;

        if !geo::is_within_radius(drone.location, order.destination, RADIUS_FEET) {
            return Err(Error::FailedPrecondition(
                "not within destination radius".to_string(),
            ));
        }

        let final_status = if delivered {
            OrderStatus::Delivered
        } else {
            OrderStatus::Failed
        };
        self.db.update_order_status(order.id, final_status).await?;
        self.db.unassign_job(drone.id).await?;

        info!(drone = %drone.id, order = %order.id, status = %final_status, "order completed");
        self.fetch_order(order.id).await
    }

    /// mark the calling drone broken, handing off any en_route order.
    ///
    /// a carried en_route order becomes re-reservable at the drone's last
    /// known location (`to_pick_up` with pickup coordinates). the drone is
    /// unassigned whenever it held anything, and only marked broken once the
    /// handoff writes have succeeded. returns the handed-off order, if any.
    pub async fn mark_broken(&self, principal_name: &str) -> Result<Option<Order>> {
        let drone = self.resolve_drone(principal_name).await?;

        let mut affected: Option<OrderId> = None;
        if let Some(order_id) = drone.assigned_job {
            if let Some(order) = self.db.get_order(order_id).await? {
                if order.status == OrderStatus::EnRoute {
                    self.db.update_order_status(order.id, OrderStatus::ToPickUp).await?;
                    self.db.update_pickup_location(order.id, drone.location).await?;
                    affected = Some(order.id);
                }
            }
            self.db.unassign_job(drone.id).await?;
        }

        self.db.update_drone_status(drone.id, DroneStatus::Broken).await?;
        info!(drone = %drone.id, handoff = affected.is_some(), "drone marked broken");

        match affected {
            Some(id) => Ok(self.db.get_order(id).await?),
            None => Ok(None),
        }
    }

    /// record a heartbeat: the drone's location and speed. broken drones may
    /// still report.
    pub async fn heartbeat(
        &self,
        principal_name: &str,
        location: Coordinates,
        speed_mph: f64,
    ) -> Result<()> {
        let drone = self.resolve_drone(principal_name).await?;
        self.db
            .update_drone_location_and_speed(drone.id, location, speed_mph)
            .await?;
        Ok(())
    }

    /// the drone's assigned order together with its estimated time of
    /// arrival in seconds.
    pub async fn get_assigned_order(&self, principal_name: &str) -> Result<(Order, f64)> {
        let drone = self.resolve_drone(principal_name).await?;

        if drone.assigned_job.is_none() {
            return Err(Error::FailedPrecondition("no assigned order".to_string()));
        }
        let order = self
            .db
            .get_assigned_order_for_drone(drone.id)
            .await?
            .ok_or(Error::NotFound("order"))?;

        let eta = calculate_eta_seconds(&order, &drone);
        Ok((order, eta))
    }

    // ─── End-user operations ─────────────────────────────────────────────────

    /// place a new order for the calling user.
    pub async fn set_order(
        &self,
        username: &str,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Order> {
        let user = self.resolve_user(username).await?;

        let order = Order {
            id: OrderId(0),
            origin,
            destination,
            status: OrderStatus::Placed,
            placement_at: String::new(),
            submitted_by: user.id,
            pickup: None,
            drone_path: String::new(),
        };
        let created = self.db.create_order(&order).await?;
        info!(user = %user.id, order = %created.id, "order placed");
        Ok(created)
    }

    /// withdraw an order. only the submitter may withdraw; the status is set
    /// unconditionally, matching the store's lenient withdraw semantics.
    pub async fn withdraw_order(&self, username: &str, order_id: OrderId) -> Result<Order> {
        let user = self.resolve_user(username).await?;
        let order = self
            .db
            .get_order(order_id)
            .await?
            .ok_or(Error::NotFound("order"))?;

        if order.submitted_by != user.id {
            return Err(Error::PermissionDenied(
                "cannot withdraw another user's order".to_string(),
            ));
        }

        self.db.update_order_status(order_id, OrderStatus::Withdrawn).await?;
        info!(user = %user.id, order = %order_id, "order withdrawn");
        self.fetch_order(order_id).await
    }

    /// a page of the calling user's orders, newest first. `cursor` is the
    /// decoded keyset `(placement unix seconds, order id)` of the previous
    /// page's last row.
    pub async fn list_orders(
        &self,
        username: &str,
        page_size: u64,
        cursor: Option<(i64, i64)>,
    ) -> Result<Vec<Order>> {
        let user = self.resolve_user(username).await?;
        let (after_seconds, after_id) = cursor.unwrap_or((0, 0));
        Ok(self
            .db
            .list_orders_for_user_page(user.id, page_size, after_seconds, after_id)
            .await?)
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// the drone's assigned order. a dangling assignment (order deleted out
    /// from under the drone) is cleared before reporting not-found.
    async fn assigned_order_or_unassign(&self, drone: &Drone) -> Result<Order> {
        let Some(order_id) = drone.assigned_job else {
            return Err(Error::FailedPrecondition("no assigned order".to_string()));
        };
        match self.db.get_order(order_id).await? {
            Some(order) => Ok(order),
            None => {
                self.db.unassign_job(drone.id).await?;
                Err(Error::NotFound("order"))
            }
        }
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Order> {
        self.db.get_order(id).await?.ok_or(Error::NotFound("order"))
    }
}

/// expected time of arrival in seconds for a drone carrying (or about to
/// carry) an order.
///
/// before pickup the drone flies to the start point and on to the
/// destination; en_route only the remaining leg counts. a non-positive speed
/// or a terminal status yields zero.
pub fn calculate_eta_seconds(order: &Order, drone: &Drone) -> f64 {
    if drone.speed_mph <= 0.0 {
        return 0.0;
    }

    match order.status {
        OrderStatus::Placed | OrderStatus::ToPickUp => {
            let start = order.pickup_target();
            let to_start = geo::haversine_miles(drone.location, start);
            let to_destination = geo::haversine_miles(start, order.destination);
            (to_start + to_destination) / drone.speed_mph * SECONDS_PER_HOUR
        }
        OrderStatus::EnRoute => {
            let to_destination = geo::haversine_miles(drone.location, order.destination);
            to_destination / drone.speed_mph * SECONDS_PER_HOUR
        }
        _ => 0.0,
    }
}
