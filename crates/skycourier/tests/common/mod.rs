//! shared helpers for api integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use tower::ServiceExt;

use skycourier::{auth, create_app};
use skycourier_db::SkycourierDb;
use skycourier_types::Config;

/// signing secret shared between the test app and minted tokens.
pub const SECRET: &str = "integration-test-secret";

/// build an app over a fresh in-memory database.
pub async fn test_app() -> (Router, SkycourierDb) {
    let db = SkycourierDb::new_in_memory()
        .await
        .expect("failed to create in-memory database");
    let mut config = Config::default();
    config.auth.jwt_secret = SECRET.to_string();
    let app = create_app(db.clone(), config);
    (app, db)
}

/// mint a bearer token for the given principal.
pub fn token(name: &str, kind: &str) -> String {
    auth::sign_token(SECRET, name, kind, 3600).expect("failed to sign token")
}

/// drive one request through the app.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    app.clone().oneshot(request).await.expect("request failed")
}

/// read a response body as json.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse response body")
}
