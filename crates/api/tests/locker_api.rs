//! HTTP-level integration tests for the `/lockers` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete, get, initialize_lockers, post, post_json, put_json,
    register_student,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initialize_seeds_once() {
    let app = build_test_app();

    let first = body_json(post(app.clone(), "/api/v1/lockers/initialize").await).await;
    assert_eq!(first["data"]["created"].as_array().unwrap().len(), 16);
    assert_eq!(first["data"]["existing"], 0);

    let second = body_json(post(app.clone(), "/api/v1/lockers/initialize").await).await;
    assert!(second["data"]["created"].as_array().unwrap().is_empty());
    assert_eq!(second["data"]["existing"], 16);

    let lockers = body_json(get(app, "/api/v1/lockers").await).await;
    let numbers: Vec<&str> = lockers["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers.len(), 16);
    assert_eq!(numbers.first(), Some(&"1001"));
    assert_eq!(numbers.last(), Some(&"1016"));
}

#[tokio::test]
async fn grid_layout_has_one_row_per_row_locker() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let json = body_json(get(app, "/api/v1/lockers/grid").await).await;
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(json["data"]["columns_per_row"], 2);
    assert_eq!(rows[0]["row_locker"]["id"], "locker_1001");
}

#[tokio::test]
async fn empty_grid_is_empty() {
    let json = body_json(get(build_test_app(), "/api/v1/lockers/grid").await).await;
    assert!(json["data"]["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adding_a_column_appends_the_next_number() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = post(app.clone(), "/api/v1/lockers/columns").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["locker"]["id"], "locker_1017");
    assert_eq!(json["data"]["created"], true);
}

#[tokio::test]
async fn adding_a_row_that_collides_with_a_column_number_is_rejected() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = post(app.clone(), "/api/v1/lockers/rows").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let lockers = body_json(get(app, "/api/v1/lockers").await).await;
    assert_eq!(lockers["data"].as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn removing_a_column_deletes_the_terminal_locker() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = delete(app.clone(), "/api/v1/lockers/columns").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], "locker_1016");
}

#[tokio::test]
async fn the_last_row_cannot_be_removed() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    for _ in 0..5 {
        let response = delete(app.clone(), "/api/v1/lockers/rows").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = delete(app, "/api/v1/lockers/rows").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "LAST_ELEMENT");
}

#[tokio::test]
async fn an_occupied_terminal_locker_blocks_shrinking() {
    let app = build_test_app();
    initialize_lockers(&app).await;
    let student_id = register_student(&app, "Tan Wei", "S1001", "3A").await;

    let response = post_json(
        app.clone(),
        "/api/v1/lockers/locker_1016/assignment",
        json!({ "student_id": student_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete(app, "/api/v1/lockers/columns").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "OCCUPIED_AXIS_ELEMENT");
}

// ---------------------------------------------------------------------------
// Assignment lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_resolve_and_unassign() {
    let app = build_test_app();
    initialize_lockers(&app).await;
    let student_id = register_student(&app, "Tan Wei", "S1001", "3A").await;

    let response = post_json(
        app.clone(),
        "/api/v1/lockers/locker_1003/assignment",
        json!({ "student_id": student_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["locker"]["is_occupied"], true);
    assert_eq!(json["data"]["assignment"]["locker_id"], "locker_1003");

    let student = body_json(get(app.clone(), "/api/v1/lockers/locker_1003/student").await).await;
    assert_eq!(student["data"]["name"], "Tan Wei");
    assert_eq!(student["data"]["school_number"], "S1001");

    let board = body_json(get(app.clone(), "/api/v1/lockers/board").await).await;
    assert_eq!(board["data"]["summary"]["occupied"], 1);
    let tile = board["data"]["tiles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["locker_id"] == "locker_1003")
        .unwrap()
        .clone();
    assert_eq!(tile["status"], "occupied");
    assert_eq!(tile["occupant"]["name"], "Tan Wei");

    let response = delete(app.clone(), "/api/v1/lockers/locker_1003/assignment").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["locker"]["is_occupied"], false);
    assert!(json.get("warning").is_none());

    let student = body_json(get(app, "/api/v1/lockers/locker_1003/student").await).await;
    assert!(student["data"].is_null());
}

#[tokio::test]
async fn a_second_assignment_to_the_same_locker_is_rejected() {
    let app = build_test_app();
    initialize_lockers(&app).await;
    let first = register_student(&app, "Tan Wei", "S1001", "3A").await;
    let second = register_student(&app, "Siti Aminah", "S1002", "3B").await;

    let response = post_json(
        app.clone(),
        "/api/v1/lockers/locker_1003/assignment",
        json!({ "student_id": first }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        "/api/v1/lockers/locker_1003/assignment",
        json!({ "student_id": second }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_OCCUPIED");

    let student = body_json(get(app, "/api/v1/lockers/locker_1003/student").await).await;
    assert_eq!(student["data"]["name"], "Tan Wei");
}

#[tokio::test]
async fn assigning_an_unknown_student_is_not_found() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = post_json(
        app,
        "/api/v1/lockers/locker_1003/assignment",
        json!({ "student_id": "no-such-response" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unassigning_a_vacant_locker_is_not_found() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = delete(app, "/api/v1/lockers/locker_1003/assignment").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Broken flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broken_flag_round_trip() {
    let app = build_test_app();
    initialize_lockers(&app).await;

    let response = put_json(
        app.clone(),
        "/api/v1/lockers/locker_1005/broken",
        json!({ "remarks": "  hinge snapped  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_broken"], true);
    assert_eq!(json["data"]["broken_remarks"], "hinge snapped");

    let stats = body_json(get(app.clone(), "/api/v1/dashboard/stats").await).await;
    assert_eq!(stats["data"]["broken_lockers"], 1);
    assert_eq!(stats["data"]["available_lockers"], 15);

    let response = delete(app, "/api/v1/lockers/locker_1005/broken").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_broken"], false);
    assert!(json["data"]["broken_remarks"].is_null());
}

#[tokio::test]
async fn marking_an_unknown_locker_is_not_found() {
    let response = put_json(
        build_test_app(),
        "/api/v1/lockers/locker_9999/broken",
        json!({ "remarks": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
