//! HTTP-level tests for store failures in the middle of multi-step
//! mutations, and for oversized signature input.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_from, delete, get, initialize_lockers, post_json,
    register_student, test_state,
};
use locker_core::store::faulty::{Fault, FaultyStore};
use locker_core::store::{Collection, Store};
use serde_json::json;

fn stroke(width: f64) -> serde_json::Value {
    json!({
        "pad": { "width": 400, "height": 200, "device_pixel_ratio": 1.0 },
        "container_width": width,
        "events": [
            { "type": "down", "x": 40, "y": 100 },
            { "type": "move", "x": 320, "y": 90 },
            { "type": "up" }
        ]
    })
}

/// Seed lockers, register a student, and assign them to `locker_1003`.
/// Returns the assignment id.
async fn assign_1003(app: &axum::Router) -> String {
    initialize_lockers(app).await;
    let student_id = register_student(app, "Tan Wei", "S1001", "3A").await;
    let response = post_json(
        app.clone(),
        "/api/v1/lockers/locker_1003/assignment",
        json!({ "student_id": student_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["assignment"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn unassign_reports_signature_cleanup_failure_as_warning() {
    let store = Arc::new(FaultyStore::new());
    let app = build_test_app_from(test_state(store.clone()));
    let assignment_id = assign_1003(&app).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/assignments/{assignment_id}/signature"),
        stroke(400.0),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    store.fail(Fault::DeleteSignatures);
    let response = delete(app.clone(), "/api/v1/lockers/locker_1003/assignment").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["locker"]["is_occupied"], false);
    assert_eq!(json["data"]["signatures_removed"], 0);
    assert!(json["warning"]
        .as_str()
        .unwrap()
        .contains("signature cleanup failed"));

    let assignments = body_json(get(app, "/api/v1/assignments").await).await;
    assert!(assignments["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn failed_locker_release_still_publishes_assignment_removal() {
    let store = Arc::new(FaultyStore::new());
    let state = test_state(store.clone());
    let mut rx = state.event_bus.subscribe();
    let app = build_test_app_from(state);
    assign_1003(&app).await;
    while rx.try_recv().is_ok() {}

    store.fail(Fault::VacateLocker);
    let response = delete(app.clone(), "/api/v1/lockers/locker_1003/assignment").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "PARTIAL_FAILURE");

    let mut collections = Vec::new();
    while let Ok(event) = rx.try_recv() {
        collections.push(event.collection);
    }
    assert!(collections.contains(&Collection::Assignments));
    assert!(store.list_assignments().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_signature_layout_is_clamped() {
    let app = build_test_app();
    let assignment_id = assign_1003(&app).await;

    let mut script = stroke(60000.0);
    script["pad"]["device_pixel_ratio"] = json!(1e6);
    script["events"]
        .as_array_mut()
        .unwrap()
        .insert(0, json!({ "type": "resize", "container_width": 1e12 }));

    let response = post_json(
        app,
        &format!("/api/v1/assignments/{assignment_id}/signature"),
        script,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn overlong_signature_input_is_rejected() {
    let app = build_test_app();
    let assignment_id = assign_1003(&app).await;

    let mut events = vec![json!({ "type": "down", "x": 10, "y": 10 })];
    events.extend((0..20_000).map(|i| json!({ "type": "move", "x": 10 + i % 300, "y": 50 })));
    let script = json!({ "container_width": 400, "events": events });

    let response = post_json(
        app.clone(),
        &format!("/api/v1/assignments/{assignment_id}/signature"),
        script,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let signatures = body_json(get(app, "/api/v1/signatures").await).await;
    assert!(signatures["data"].as_array().unwrap().is_empty());
}
