//! skycourier library - http handlers and application setup.

pub mod auth;
pub mod cli;
pub mod handlers;

use axum::{Router, middleware, routing::get};
use skycourier_db::SkycourierDb;
use skycourier_dispatch::DispatchEngine;
use skycourier_types::Config;

/// application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SkycourierDb,
    pub engine: DispatchEngine<SkycourierDb>,
    pub config: Config,
}

/// create the axum application with all routes.
///
/// everything runs behind the auth middleware; paths on the config allowlist
/// (the health check by default) pass through unauthenticated.
pub fn create_app(db: SkycourierDb, config: Config) -> Router {
    let engine = DispatchEngine::new(db.clone());
    let state = AppState { db, engine, config };

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1/orders", handlers::orders::router())
        .nest("/api/v1/drone", handlers::drone::router())
        .nest("/api/v1/admin", handlers::admin::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .with_state(state)
}
