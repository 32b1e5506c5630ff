//! end-user order endpoints.
//!
//! endpoints:
//! - `POST /api/v1/orders` - place an order
//! - `GET /api/v1/orders` - list the caller's orders, paginated
//! - `POST /api/v1/orders/{id}/withdraw` - withdraw an order

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{Principal, require_end_user_or_admin};
use crate::handlers::{ApiError, OrderResponse, cursor};
use skycourier_types::{Coordinates, OrderId};

/// request to place an order.
#[derive(Debug, Deserialize)]
pub struct SetOrderRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
}

/// response wrapper for single-order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

/// pagination parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default)]
    pub page_size: u64,
    #[serde(default)]
    pub page_token: String,
}

/// response for the order listing.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
    pub next_page_token: String,
}

/// create the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(set_order).get(list_orders))
        .route("/{id}/withdraw", post(withdraw_order))
}

/// place a new order for the authenticated user.
///
/// `POST /api/v1/orders`
async fn set_order(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<SetOrderRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_end_user_or_admin(&principal)?;

    let order = state
        .engine
        .set_order(&principal.name, req.origin, req.destination)
        .await?;

    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// withdraw an order. only the submitter may withdraw.
///
/// `POST /api/v1/orders/{id}/withdraw`
async fn withdraw_order(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    require_end_user_or_admin(&principal)?;
    if id <= 0 {
        return Err(ApiError::invalid_argument("order id is required"));
    }

    let order = state
        .engine
        .withdraw_order(&principal.name, OrderId(id))
        .await?;

    Ok(Json(OrderEnvelope {
        order: order.into(),
    }))
}

/// paginated listing of the caller's orders, newest first.
///
/// `GET /api/v1/orders?page_size=&page_token=`
async fn list_orders(
    principal: Principal,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    require_end_user_or_admin(&principal)?;

    let page_size = skycourier_db::clamp_page_size(query.page_size);
    let cursor = if query.page_token.is_empty() {
        None
    } else {
        Some(cursor::decode_cursor(&query.page_token).map_err(|e| {
            ApiError::invalid_argument(format!("invalid page_token: {e}"))
        })?)
    };

    let orders = state
        .engine
        .list_orders(&principal.name, page_size, cursor)
        .await?;

    let next_page_token = cursor::order_page_token(&orders, page_size).unwrap_or_default();
    Ok(Json(ListOrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
        next_page_token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_order_request_deserialization() {
        let json = r#"{"origin": {"lat": 1.0, "lng": 2.0}, "destination": {"lat": 3.0, "lng": 4.0}}"#;
        let req: SetOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.origin.lat, 1.0);
        assert_eq!(req.destination.lng, 4.0);
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListOrdersQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page_size, 0);
        assert!(query.page_token.is_empty());
    }
}
