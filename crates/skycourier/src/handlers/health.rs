//! service readiness endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::AppState;
use skycourier_db::Database;

/// readiness report for the dispatch service.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    store: &'static str,
}

/// `GET /health` - service readiness.
///
/// dispatch holds no state of its own, so readiness is exactly whether the
/// entity store answers. the ping runs under the store's point-operation
/// deadline, so an unresponsive database turns into a 500 instead of a hung
/// probe.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "reachable",
            }),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                status: "degraded",
                store: "unreachable",
            }),
        ),
    }
}
