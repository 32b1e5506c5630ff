//! admin endpoints: filtered listings and targeted mutations.
//!
//! endpoints:
//! - `GET /api/v1/admin/orders` - list orders with filters
//! - `POST /api/v1/admin/orders/{id}/location` - move an order's coordinates
//! - `GET /api/v1/admin/drones` - list drones with filters
//! - `POST /api/v1/admin/drones/{id}/status` - flip a drone fixed/broken
//!
//! every endpoint re-verifies the persisted admin role; a spoofed admin
//! claim from a regular user is rejected.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{Principal, require_admin};
use crate::handlers::{ApiError, DroneResponse, OrderResponse, cursor};
use skycourier_db::{Database, ListDronesAdminParams, ListOrdersAdminParams, clamp_page_size};
use skycourier_types::{Coordinates, DroneId, DroneStatus, OrderId, OrderStatus, UserId};

/// query parameters for the admin order listing.
#[derive(Debug, Deserialize)]
pub struct GetOrdersQuery {
    /// comma-separated status filter, e.g. `placed,en_route`.
    #[serde(default)]
    pub status: String,
    pub submitted_by: Option<i64>,
    pub placement_from: Option<String>,
    pub placement_to: Option<String>,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub page_token: String,
}

/// response for the admin order listing.
#[derive(Debug, Serialize)]
pub struct GetOrdersResponse {
    pub orders: Vec<OrderResponse>,
    pub next_page_token: String,
}

/// request to move an order's origin and destination.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderLocationRequest {
    pub origin: Option<Coordinates>,
    pub destination: Option<Coordinates>,
}

/// response wrapper for single-order mutations.
#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

/// query parameters for the admin drone listing.
#[derive(Debug, Deserialize)]
pub struct GetDronesQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub assigned_only: bool,
    #[serde(default)]
    pub unassigned_only: bool,
    #[serde(default)]
    pub name_or_serial_contains: String,
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub page_token: String,
}

/// response for the admin drone listing.
#[derive(Debug, Serialize)]
pub struct GetDronesResponse {
    pub drones: Vec<DroneResponse>,
    pub next_page_token: String,
}

/// request to flip a drone's status.
#[derive(Debug, Deserialize)]
pub struct UpdateDroneStatusRequest {
    pub status: Option<String>,
}

/// response wrapper for single-drone mutations.
#[derive(Debug, Serialize)]
pub struct DroneEnvelope {
    pub drone: DroneResponse,
}

/// create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(get_orders))
        .route("/orders/{id}/location", post(update_order_location))
        .route("/drones", get(get_drones))
        .route("/drones/{id}/status", post(update_drone_status))
}

/// parse a comma-separated status filter.
fn parse_status_filter(raw: &str) -> Result<Vec<OrderStatus>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            OrderStatus::parse(s)
                .ok_or_else(|| ApiError::invalid_argument(format!("unknown order status: {s}")))
        })
        .collect()
}

/// list orders with optional filters and cursor pagination.
///
/// `GET /api/v1/admin/orders`
async fn get_orders(
    principal: Principal,
    State(state): State<AppState>,
    Query(query): Query<GetOrdersQuery>,
) -> Result<Json<GetOrdersResponse>, ApiError> {
    require_admin(&state.db, &principal).await?;

    let (after_seconds, after_id) = if query.page_token.trim().is_empty() {
        (0, 0)
    } else {
        cursor::decode_cursor(query.page_token.trim())
            .map_err(|e| ApiError::invalid_argument(format!("invalid page_token: {e}")))?
    };

    let page_size = clamp_page_size(query.page_size);
    let orders = state
        .db
        .list_orders_admin(ListOrdersAdminParams {
            statuses: parse_status_filter(&query.status)?,
            submitted_by: query.submitted_by.map(UserId),
            placement_from: query
                .placement_from
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            placement_to: query
                .placement_to
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page_size,
            after_seconds,
            after_id,
        })
        .await?;

    let next_page_token = cursor::order_page_token(&orders, page_size).unwrap_or_default();
    Ok(Json(GetOrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
        next_page_token,
    }))
}

/// update both origin and destination of an order.
///
/// `POST /api/v1/admin/orders/{id}/location`
async fn update_order_location(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderLocationRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_admin(&state.db, &principal).await?;

    if id <= 0 {
        return Err(ApiError::invalid_argument("order id is required"));
    }
    let (origin, destination) = match (req.origin, req.destination) {
        (Some(origin), Some(destination)) => (origin, destination),
        _ => {
            return Err(ApiError::invalid_argument(
                "origin and destination are required",
            ));
        }
    };

    let order_id = OrderId(id);
    // zero rows changed surfaces as not-found from the store
    state
        .db
        .update_order_locations(order_id, origin, destination)
        .await?;

    let order = state
        .db
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("order not found"))?;
    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// list drones with optional filters and a decimal id cursor.
///
/// `GET /api/v1/admin/drones`
async fn get_drones(
    principal: Principal,
    State(state): State<AppState>,
    Query(query): Query<GetDronesQuery>,
) -> Result<Json<GetDronesResponse>, ApiError> {
    require_admin(&state.db, &principal).await?;

    let after_id = match query.page_token.trim() {
        "" => 0,
        token => token
            .parse::<i64>()
            .map_err(|_| ApiError::invalid_argument("invalid page_token"))?,
    };

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            DroneStatus::parse(raw)
                .ok_or_else(|| ApiError::invalid_argument(format!("unknown drone status: {raw}")))?,
        ),
    };

    let page_size = clamp_page_size(query.page_size);
    let drones = state
        .db
        .list_drones_admin(ListDronesAdminParams {
            status,
            assigned_only: query.assigned_only,
            unassigned_only: query.unassigned_only,
            name_or_serial_contains: Some(query.name_or_serial_contains)
                .filter(|s| !s.trim().is_empty()),
            page_size,
            after_id,
        })
        .await?;

    // a full page hands out the last id as the next cursor
    let next_page_token = if drones.len() as u64 == page_size {
        drones
            .last()
            .map(|d| d.id.0.to_string())
            .unwrap_or_default()
    } else {
        String::new()
    };

    Ok(Json(GetDronesResponse {
        drones: drones.into_iter().map(Into::into).collect(),
        next_page_token,
    }))
}

/// mark a drone fixed or broken.
///
/// `POST /api/v1/admin/drones/{id}/status`
async fn update_drone_status(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDroneStatusRequest>,
) -> Result<Json<DroneEnvelope>, ApiError> {
    require_admin(&state.db, &principal).await?;

    if id <= 0 {
        return Err(ApiError::invalid_argument("drone id is required"));
    }
    let status = req
        .status
        .as_deref()
        .and_then(DroneStatus::parse)
        .ok_or_else(|| ApiError::invalid_argument("status must be fixed or broken"))?;

    let drone_id = DroneId(id);
    state.db.update_drone_status(drone_id, status).await?;

    let drone = state
        .db
        .get_drone(drone_id)
        .await?
        .ok_or_else(|| ApiError::not_found("drone not found"))?;
    Ok(Json(DroneEnvelope {
        drone: drone.into(),
    }))
}
