//! integration tests for the order lifecycle driven through the api:
//! place, reserve, grab, complete, and the broken-drone handoff.

mod common;

use axum::http::StatusCode;
use common::{body_json, send, test_app, token};
use skycourier_db::Database;
use skycourier_types::{Coordinates, Drone, DroneId};

async fn seed_drone(db: &skycourier_db::SkycourierDb, serial: &str, at: Coordinates) -> Drone {
    db.create_drone(&Drone::new(
        DroneId(0),
        format!("unit-{serial}"),
        serial.to_string(),
        at,
    ))
    .await
    .unwrap()
}

#[tokio::test]
async fn test_full_delivery_flow() {
    let (app, db) = test_app().await;
    db.create_user("alice").await.unwrap();
    let drone = seed_drone(&db, "SN-1", Coordinates::new(0.0, 0.0)).await;

    let alice = token("alice", "enduser");
    let sn1 = token("SN-1", "drone");

    // place
    let response = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(&alice),
        Some(serde_json::json!({
            "origin": {"lat": 0.0, "lng": 0.0},
            "destination": {"lat": 1.0, "lng": 1.0},
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["status"], "placed");
    let order_id = body["order"]["id"].as_i64().unwrap();

    // reserve: the order is claimed but its status does not advance
    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["id"].as_i64().unwrap(), order_id);
    assert_eq!(body["order"]["status"], "placed");

    // the assigned-order endpoint reports a positive eta once speed is known
    let response = send(
        &app,
        "POST",
        "/api/v1/drone/heartbeat",
        Some(&sn1),
        Some(serde_json::json!({
            "location": {"lat": 0.0, "lng": 0.0},
            "speed_mph": 30.0,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", "/api/v1/drone/order", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["eta_seconds"].as_f64().unwrap() > 0.0);

    // grab inside the origin geofence
    let response = send(&app, "POST", "/api/v1/drone/grab", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["status"], "en_route");

    // fly to the destination and complete as delivered
    let response = send(
        &app,
        "POST",
        "/api/v1/drone/heartbeat",
        Some(&sn1),
        Some(serde_json::json!({
            "location": {"lat": 1.0, "lng": 1.0},
            "speed_mph": 30.0,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(
        &app,
        "POST",
        "/api/v1/drone/complete",
        Some(&sn1),
        Some(serde_json::json!({"delivered": true})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["status"], "delivered");

    // the drone is released
    let released = db.get_drone(drone.id).await.unwrap().unwrap();
    assert!(released.assigned_job.is_none());
}

#[tokio::test]
async fn test_grab_outside_geofence_is_precondition_failed() {
    let (app, db) = test_app().await;
    db.create_user("alice").await.unwrap();
    seed_drone(&db, "SN-1", Coordinates::new(10.0, 10.0)).await;

    let alice = token("alice", "enduser");
    let sn1 = token("SN-1", "drone");

    let response = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(&alice),
        Some(serde_json::json!({
            "origin": {"lat": 0.0, "lng": 0.0},
            "destination": {"lat": 1.0, "lng": 1.0},
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // ten degrees away from the origin
    let response = send(&app, "POST", "/api/v1/drone/grab", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_broken_handoff_flow() {
    let (app, db) = test_app().await;
    db.create_user("alice").await.unwrap();
    seed_drone(&db, "SN-1", Coordinates::new(0.0, 0.0)).await;

    let alice = token("alice", "enduser");
    let sn1 = token("SN-1", "drone");

    let response = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(&alice),
        Some(serde_json::json!({
            "origin": {"lat": 0.0, "lng": 0.0},
            "destination": {"lat": 1.0, "lng": 1.0},
        })),
    )
    .await;
    let order_id = body_json(response).await["order"]["id"].as_i64().unwrap();

    send(&app, "POST", "/api/v1/drone/reserve", Some(&sn1), None).await;
    send(&app, "POST", "/api/v1/drone/grab", Some(&sn1), None).await;

    // the drone gets halfway and breaks down
    send(
        &app,
        "POST",
        "/api/v1/drone/heartbeat",
        Some(&sn1),
        Some(serde_json::json!({
            "location": {"lat": 0.5, "lng": 0.5},
            "speed_mph": 0.0,
        })),
    )
    .await;
    let response = send(&app, "POST", "/api/v1/drone/broken", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["id"].as_i64().unwrap(), order_id);
    assert_eq!(body["order"]["status"], "to_pick_up");
    assert_eq!(body["order"]["pickup"]["lat"].as_f64().unwrap(), 0.5);

    // a broken drone cannot reserve again
    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

    // a second drone at the handoff point takes over and grabs there
    seed_drone(&db, "SN-2", Coordinates::new(0.5, 0.5)).await;
    let sn2 = token("SN-2", "drone");
    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&sn2), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["id"].as_i64().unwrap(), order_id);

    let response = send(&app, "POST", "/api/v1/drone/grab", Some(&sn2), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["status"], "en_route");
}

#[tokio::test]
async fn test_heartbeat_requires_location() {
    let (app, db) = test_app().await;
    seed_drone(&db, "SN-1", Coordinates::new(0.0, 0.0)).await;

    let sn1 = token("SN-1", "drone");
    let response = send(
        &app,
        "POST",
        "/api/v1/drone/heartbeat",
        Some(&sn1),
        Some(serde_json::json!({"speed_mph": 5.0})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reserve_with_nothing_available() {
    let (app, db) = test_app().await;
    seed_drone(&db, "SN-1", Coordinates::new(0.0, 0.0)).await;

    let sn1 = token("SN-1", "drone");
    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&sn1), None).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_unknown_drone_principal_is_not_found() {
    let (app, _db) = test_app().await;
    let ghost = token("no-such-serial", "drone");
    let response = send(&app, "POST", "/api/v1/drone/reserve", Some(&ghost), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_withdraw_rules() {
    let (app, db) = test_app().await;
    db.create_user("alice").await.unwrap();
    db.create_user("mallory").await.unwrap();

    let alice = token("alice", "enduser");
    let mallory = token("mallory", "enduser");

    let response = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(&alice),
        Some(serde_json::json!({
            "origin": {"lat": 0.0, "lng": 0.0},
            "destination": {"lat": 1.0, "lng": 1.0},
        })),
    )
    .await;
    let order_id = body_json(response).await["order"]["id"].as_i64().unwrap();

    // someone else's order
    let response = send(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/withdraw"),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // the submitter may withdraw
    let response = send(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/withdraw"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order"]["status"], "withdrawn");

    // a missing order is not found
    let response = send(
        &app,
        "POST",
        "/api/v1/orders/99999/withdraw",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
