// ABOUTME: HTTP tests for the training flow from library to analytics
// ABOUTME: Builds a template with a circuit, runs a session over the API and checks derived figures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use axum::{http::StatusCode, Router};
use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{create_test_app, register_user};
use serde_json::{json, Value};

async fn create_exercise(app: &Router, token: &str, name: &str, category: &str) -> String {
    let body: Value = AxumTestRequest::post("/api/exercises")
        .bearer(token)
        .json(&json!({ "name": name, "category": category }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_active_session_is_null_when_idle() {
    let app = create_test_app().await;
    let token = register_user(&app, "idle@example.com").await;

    let body: Value = AxumTestRequest::get("/api/sessions/active")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(body.is_null());
}

#[tokio::test]
async fn test_adhoc_session_volume_and_analytics() {
    let app = create_test_app().await;
    let token = register_user(&app, "volume@example.com").await;
    let bench = create_exercise(&app, &token, "Bench Press", "strength").await;

    // Empty body starts an ad-hoc session
    let session: Value = AxumTestRequest::post("/api/sessions")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let session_id = session["id"].as_str().unwrap().to_owned();
    assert_eq!(session["name"], "Workout");

    AxumTestRequest::post("/api/sessions")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let detail: Value = AxumTestRequest::post(&format!("/api/sessions/{session_id}/exercises"))
        .bearer(&token)
        .json(&json!({ "exercise_id": bench }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let row_id = detail["exercises"][0]["id"].as_str().unwrap().to_owned();

    for (reps, weight) in [(10, 100.0), (8, 120.0)] {
        AxumTestRequest::post(&format!(
            "/api/sessions/{session_id}/exercises/{row_id}/sets"
        ))
        .bearer(&token)
        .json(&json!({ "reps": reps, "weight": weight }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    }
    // Warm-ups add volume but never set records
    AxumTestRequest::post(&format!(
        "/api/sessions/{session_id}/exercises/{row_id}/sets"
    ))
    .bearer(&token)
    .json(&json!({ "reps": 15, "weight": 40.0, "is_warmup": true }))
    .send(app.clone())
    .await
    .assert_status(StatusCode::CREATED);

    let prefill: Value = AxumTestRequest::get(&format!(
        "/api/sessions/{session_id}/exercises/{row_id}/prefill"
    ))
    .bearer(&token)
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert_eq!(prefill["set_number"], 4);
    assert_eq!(prefill["source"], "previous_set");

    let ended: Value = AxumTestRequest::post(&format!("/api/sessions/{session_id}/end"))
        .bearer(&token)
        .json(&json!({ "notes": "Felt strong" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(ended["ended_at"].is_string());
    assert_eq!(ended["notes"], "Felt strong");
    assert!((ended["total_volume"].as_f64().unwrap() - 2560.0).abs() < f64::EPSILON);

    AxumTestRequest::post(&format!("/api/sessions/{session_id}/end"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let volume: Value = AxumTestRequest::get("/api/analytics/volume")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let points = volume.as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert!((points[0]["volume"].as_f64().unwrap() - 2560.0).abs() < f64::EPSILON);
    assert_eq!(points[0]["set_count"], 3);

    let by_category: Value = AxumTestRequest::get("/api/analytics/volume-by-category")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(by_category[0]["category"], "strength");

    let records: Value = AxumTestRequest::get("/api/analytics/prs")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(!records.as_array().unwrap().is_empty());
    assert!(records
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["exercise_name"] == "Bench Press"));

    let overview: Value = AxumTestRequest::get("/api/analytics/overview")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(overview["total_sessions"], 1);
    assert!(overview["active_session_id"].is_null());

    let last: Value = AxumTestRequest::get(&format!("/api/exercises/{bench}/last-performance"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(last["session_id"], session_id.as_str());
    assert_eq!(last["sets"].as_array().unwrap().len(), 3);

    let history: Value = AxumTestRequest::get("/api/sessions")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_template_with_circuit_starts_session() {
    let app = create_test_app().await;
    let token = register_user(&app, "circuit@example.com").await;
    let squat = create_exercise(&app, &token, "Squat", "strength").await;
    let jump = create_exercise(&app, &token, "Jump Squat", "plyometric").await;
    let twist = create_exercise(&app, &token, "Twist", "core").await;

    let circuit: Value = AxumTestRequest::post("/api/circuits")
        .bearer(&token)
        .json(&json!({
            "name": "Legs Finisher",
            "rounds": 2,
            "exercises": [
                { "exercise_id": jump, "default_reps": 12 },
                { "exercise_id": twist, "default_reps": 20 }
            ]
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let circuit_id = circuit["id"].as_str().unwrap().to_owned();
    assert_eq!(circuit["exercises"].as_array().unwrap().len(), 2);

    let template: Value = AxumTestRequest::post("/api/templates")
        .bearer(&token)
        .json(&json!({ "name": "Leg Day" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let template_id = template["id"].as_str().unwrap().to_owned();

    AxumTestRequest::post(&format!("/api/templates/{template_id}/exercises"))
        .bearer(&token)
        .json(&json!({ "exercise_id": squat, "sets": 3 }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let detail: Value = AxumTestRequest::post(&format!("/api/templates/{template_id}/circuits"))
        .bearer(&token)
        .json(&json!({ "circuit_id": circuit_id }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(detail["exercises"].as_array().unwrap().len(), 3);
    assert_eq!(detail["blocks"].as_array().unwrap().len(), 1);
    assert_eq!(detail["exercises"][0]["planned_sets"].as_array().unwrap().len(), 3);
    assert_eq!(detail["exercises"][1]["planned_sets"].as_array().unwrap().len(), 2);

    let today = chrono::Utc::now().date_naive().to_string();
    let item: Value = AxumTestRequest::post("/api/schedule")
        .bearer(&token)
        .json(&json!({ "template_id": template_id, "scheduled_date": today }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let item_id = item["id"].as_str().unwrap().to_owned();
    assert_eq!(item["status"], "planned");
    assert_eq!(item["template_name"], "Leg Day");

    let session: Value = AxumTestRequest::post("/api/sessions")
        .bearer(&token)
        .json(&json!({ "schedule_item_id": item_id }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let session_id = session["id"].as_str().unwrap().to_owned();
    assert_eq!(session["name"], "Leg Day");
    let rows = session["exercises"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0]["circuit_id"].is_null());
    assert_eq!(rows[1]["circuit_id"], circuit_id.as_str());
    assert_eq!(rows[2]["circuit_id"], circuit_id.as_str());

    let active: Value = AxumTestRequest::get("/api/sessions/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(active["id"], session_id.as_str());

    AxumTestRequest::post(&format!("/api/sessions/{session_id}/end"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let schedule: Value = AxumTestRequest::get("/api/schedule")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(schedule[0]["status"], "completed");
}

#[tokio::test]
async fn test_invalid_ids_and_foreign_rows() {
    let app = create_test_app().await;
    let owner = register_user(&app, "mine@example.com").await;
    let stranger = register_user(&app, "theirs@example.com").await;

    AxumTestRequest::get("/api/templates/not-a-uuid")
        .bearer(&owner)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let template: Value = AxumTestRequest::post("/api/templates")
        .bearer(&owner)
        .json(&json!({ "name": "Private" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let template_id = template["id"].as_str().unwrap();

    AxumTestRequest::get(&format!("/api/templates/{template_id}"))
        .bearer(&stranger)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&format!("/api/templates/{template_id}"))
        .bearer(&stranger)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&format!("/api/templates/{template_id}"))
        .bearer(&owner)
        .send(app)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_library_delete_reports_action() {
    let app = create_test_app().await;
    let token = register_user(&app, "library@example.com").await;
    let custom = create_exercise(&app, &token, "Sled Push", "cardio").await;

    let body: Value = AxumTestRequest::delete(&format!("/api/exercises/{custom}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["action"], "deleted");
    assert_eq!(body["id"], custom.as_str());

    AxumTestRequest::get(&format!("/api/exercises/{custom}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let categories: Value = AxumTestRequest::get("/api/exercises/categories")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(categories.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_supplement_logging_and_body_weight() {
    let app = create_test_app().await;
    let token = register_user(&app, "wellness@example.com").await;

    let supplement: Value = AxumTestRequest::post("/api/supplements")
        .bearer(&token)
        .json(&json!({ "name": "Creatine", "dosage": "5", "unit": "g" }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let supplement_id = supplement["id"].as_str().unwrap().to_owned();

    AxumTestRequest::post(&format!("/api/supplements/{supplement_id}/logs"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    AxumTestRequest::post(&format!("/api/supplements/{supplement_id}/logs"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let listed: Value = AxumTestRequest::get("/api/supplements")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed[0]["name"], "Creatine");
    assert_eq!(listed[0]["taken_today"], true);
    assert_eq!(listed[0]["current_streak"], 1);

    for (weight, days_ago) in [(81.0, 2), (80.5, 1), (80.0, 0)] {
        let recorded_on = (chrono::Utc::now().date_naive() - chrono::Duration::days(days_ago))
            .to_string();
        AxumTestRequest::post("/api/body-weight")
            .bearer(&token)
            .json(&json!({ "weight": weight, "unit": "kg", "recorded_on": recorded_on }))
            .send(app.clone())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let trend: Value = AxumTestRequest::get("/api/analytics/body-weight")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(trend["unit"], "kg");
    assert_eq!(trend["points"].as_array().unwrap().len(), 3);
    assert!((trend["change"].as_f64().unwrap() + 1.0).abs() < 1e-9);

    AxumTestRequest::post("/api/body-weight")
        .bearer(&token)
        .json(&json!({ "weight": -3.0, "unit": "kg" }))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inverted_ranges_are_rejected() {
    let app = create_test_app().await;
    let token = register_user(&app, "ranges@example.com").await;
    let query = serde_urlencoded::to_string([("from", "2025-06-30"), ("to", "2025-06-01")]).unwrap();

    for path in ["/api/schedule", "/api/analytics/volume", "/api/body-weight"] {
        AxumTestRequest::get(&format!("{path}?{query}"))
            .bearer(&token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let valid = serde_urlencoded::to_string([
        ("from", "2025-06-01"),
        ("to", "2025-06-30"),
        ("granularity", "week"),
    ])
    .unwrap();
    let points: Value = AxumTestRequest::get(&format!("/api/analytics/volume?{valid}"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(points.as_array().unwrap().is_empty());
}
