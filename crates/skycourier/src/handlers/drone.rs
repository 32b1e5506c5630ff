//! drone-actor endpoints.
//!
//! endpoints:
//! - `POST /api/v1/drone/reserve` - reserve the next available order
//! - `POST /api/v1/drone/grab` - pick up the assigned order
//! - `POST /api/v1/drone/complete` - deliver or fail the assigned order
//! - `POST /api/v1/drone/broken` - mark the drone broken, handing off cargo
//! - `POST /api/v1/drone/heartbeat` - report location and speed
//! - `GET /api/v1/drone/order` - the assigned order with its eta
//!
//! drone callers identify themselves through the principal name, resolved by
//! serial number first and display name second.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{Principal, require_drone};
use crate::handlers::{ApiError, OrderResponse};
use skycourier_types::Coordinates;

/// response wrapper for endpoints returning the affected order.
#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

/// response for mark-broken; the order is present only when a handoff
/// happened.
#[derive(Debug, Serialize)]
pub struct MarkBrokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,
}

/// request to complete the assigned order.
#[derive(Debug, Deserialize)]
pub struct CompleteOrderRequest {
    pub delivered: bool,
}

/// heartbeat payload.
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub speed_mph: f64,
}

/// empty response body.
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

/// response for the assigned-order endpoint.
#[derive(Debug, Serialize)]
pub struct AssignedOrderResponse {
    pub order: OrderResponse,
    pub eta_seconds: f64,
}

/// create the drone router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reserve", post(reserve_order))
        .route("/grab", post(grab_order))
        .route("/complete", post(complete_order))
        .route("/broken", post(mark_broken))
        .route("/heartbeat", post(heartbeat))
        .route("/order", get(get_assigned_order))
}

/// reserve the next available order for the calling drone.
///
/// `POST /api/v1/drone/reserve`
async fn reserve_order(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_drone(&principal)?;
    let order = state.engine.reserve_order(&principal.name).await?;
    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// grab the assigned order within the pickup geofence.
///
/// `POST /api/v1/drone/grab`
async fn grab_order(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_drone(&principal)?;
    let order = state.engine.grab_order(&principal.name).await?;
    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// complete the assigned order as delivered or failed.
///
/// `POST /api/v1/drone/complete`
async fn complete_order(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CompleteOrderRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_drone(&principal)?;
    let order = state
        .engine
        .complete_order(&principal.name, req.delivered)
        .await?;
    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// mark the calling drone broken; an en_route order is handed off at the
/// drone's current location.
///
/// `POST /api/v1/drone/broken`
async fn mark_broken(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<MarkBrokenResponse>, ApiError> {
    require_drone(&principal)?;
    let order = state.engine.mark_broken(&principal.name).await?;
    Ok(Json(MarkBrokenResponse {
        order: order.map(Into::into),
    }))
}

/// report the drone's location and speed.
///
/// `POST /api/v1/drone/heartbeat`
async fn heartbeat(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<EmptyResponse>, ApiError> {
    require_drone(&principal)?;
    let location = req
        .location
        .ok_or_else(|| ApiError::invalid_argument("location required"))?;
    state
        .engine
        .heartbeat(&principal.name, location, req.speed_mph)
        .await?;
    Ok(Json(EmptyResponse {}))
}

/// the assigned order with its estimated time of arrival.
///
/// `GET /api/v1/drone/order`
async fn get_assigned_order(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<AssignedOrderResponse>, ApiError> {
    require_drone(&principal)?;
    let (order, eta_seconds) = state.engine.get_assigned_order(&principal.name).await?;
    Ok(Json(AssignedOrderResponse {
        order: order.into(),
        eta_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_request_without_location() {
        let req: HeartbeatRequest = serde_json::from_str(r#"{"speed_mph": 12.5}"#).unwrap();
        assert!(req.location.is_none());
        assert_eq!(req.speed_mph, 12.5);
    }

    #[test]
    fn test_heartbeat_request_full() {
        let req: HeartbeatRequest =
            serde_json::from_str(r#"{"location": {"lat": 1.0, "lng": 2.0}, "speed_mph": 30}"#)
                .unwrap();
        assert_eq!(req.location.unwrap().lat, 1.0);
    }

    #[test]
    fn test_complete_request_deserialization() {
        let req: CompleteOrderRequest = serde_json::from_str(r#"{"delivered": true}"#).unwrap();
        assert!(req.delivered);
    }

    #[test]
    fn test_mark_broken_response_omits_null_order() {
        let json = serde_json::to_string(&MarkBrokenResponse { order: None }).unwrap();
        assert_eq!(json, "{}");
    }
}
