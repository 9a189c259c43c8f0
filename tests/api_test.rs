// ABOUTME: HTTP-level tests driving the router without a socket
// ABOUTME: Covers auth flow, the response envelope, and ownership hiding

//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 TrainTrack contributors

mod common;

use axum::body::Body;
use axum::Router;
use chrono::{Duration, Utc};
use common::{test_db, RecordingDispatcher, TestDb};
use http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use traintrack::auth::AuthManager;
use traintrack::context::ServerResources;
use traintrack::routes;

async fn test_app() -> (Router, TestDb) {
    let db = test_db().await;
    let auth_manager = AuthManager::new(b"integration-test-secret-32-bytes!".to_vec(), 24);
    let resources = Arc::new(ServerResources::new(
        db.database.clone(),
        auth_manager,
        Arc::new(RecordingDispatcher::default()),
    ));
    (routes::router(resources), db)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Register a user and return their bearer token
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/register",
            None,
            &json!({"email": email, "password": "correct-horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_unauthenticated() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_envelope() {
    let (app, _db) = test_app().await;

    let token = register(&app, "lifter@example.com").await;
    assert!(!token.is_empty());

    // Duplicate email conflicts
    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            &json!({"email": "lifter@example.com", "password": "correct-horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "RESOURCE_ALREADY_EXISTS");

    // Login with the right password
    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            &json!({"email": "lifter@example.com", "password": "correct-horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    // And the wrong one
    let (status, _) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            &json!({"email": "lifter@example.com", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/workouts", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn other_users_rows_look_missing() {
    let (app, _db) = test_app().await;
    let owner = register(&app, "owner@example.com").await;
    let intruder = register(&app, "intruder@example.com").await;

    let (status, body) = send(
        &app,
        post_json("/workouts", Some(&owner), &json!({"title": "Leg day"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let workout_id = body["data"]["id"].as_str().unwrap().to_string();

    // The owner sees it, the intruder gets a plain 404
    let (status, _) = send(&app, get(&format!("/workouts/{workout_id}"), Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        get(&format!("/workouts/{workout_id}"), Some(&intruder)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn finishing_a_workout_completes_goals() {
    let (app, _db) = test_app().await;
    let token = register(&app, "goals@example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/goals",
            Some(&token),
            &json!({
                "goal_type": "completed_workouts",
                "title": "One workout",
                "target_value": 1.0,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let goal_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = send(
        &app,
        post_json("/workouts", Some(&token), &json!({"title": "Session"})),
    )
    .await;
    let workout_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        post_json(
            &format!("/workouts/{workout_id}/finish"),
            Some(&token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get(&format!("/goals/{goal_id}"), Some(&token))).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completed_at"].is_string());
}

#[tokio::test]
async fn overachieved_goal_progress_clamped_in_response() {
    let (app, _db) = test_app().await;
    let token = register(&app, "overachiever@example.com").await;

    // Five finished workouts before the goal exists
    for i in 0..5 {
        let (_, body) = send(
            &app,
            post_json(
                "/workouts",
                Some(&token),
                &json!({"title": format!("Session {i}")}),
            ),
        )
        .await;
        let workout_id = body["data"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            post_json(&format!("/workouts/{workout_id}/finish"), Some(&token), &json!({})),
        )
        .await;
    }

    // A backdated goal of 4 is immediately overachieved at 5
    let (status, body) = send(
        &app,
        post_json(
            "/goals",
            Some(&token),
            &json!({
                "goal_type": "completed_workouts",
                "title": "Four sessions",
                "target_value": 4.0,
                "start_date": (Utc::now() - Duration::days(1)).to_rfc3339(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["current_value"], 5.0);
    assert_eq!(body["data"]["progress_percentage"], 100);

    // The same clamp applies on reads
    let goal_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = send(&app, get(&format!("/goals/{goal_id}"), Some(&token))).await;
    assert_eq!(body["data"]["progress_percentage"], 100);
}

#[tokio::test]
async fn goal_validation_rejects_bad_input() {
    let (app, _db) = test_app().await;
    let token = register(&app, "validation@example.com").await;

    // Non-positive target
    let (status, _) = send(
        &app,
        post_json(
            "/goals",
            Some(&token),
            &json!({"goal_type": "total_volume", "title": "No", "target_value": 0.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Exercise-scoped type without an exercise
    let (status, body) = send(
        &app,
        post_json(
            "/goals",
            Some(&token),
            &json!({"goal_type": "exercise_max_weight", "title": "PR", "target_value": 100.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn paginated_workout_list_has_meta() {
    let (app, _db) = test_app().await;
    let token = register(&app, "pages@example.com").await;

    for i in 0..3 {
        send(
            &app,
            post_json(
                "/workouts",
                Some(&token),
                &json!({"title": format!("Session {i}")}),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, get("/workouts?page=1&per_page=2", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["per_page"], 2);
}

#[tokio::test]
async fn notification_preferences_round_trip() {
    let (app, _db) = test_app().await;
    let token = register(&app, "prefs@example.com").await;

    // Lazily created with defaults
    let (status, body) = send(&app, get("/notifications/preferences", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["milestones"], json!([25, 50, 75, 90]));

    let request = Request::builder()
        .method("PUT")
        .uri("/notifications/preferences")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(
            json!({"progress_enabled": false, "milestones": [50, 100]}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["progress_enabled"], false);
    assert_eq!(body["data"]["milestones"], json!([50, 100]));
}

#[tokio::test]
async fn pruned_device_token_disappears_from_listing() {
    let (app, db) = test_app().await;
    let token = register(&app, "devices@example.com").await;

    for device in ["fcm-token-stale", "fcm-token-live"] {
        let (status, _) = send(
            &app,
            post_json(
                "/notifications/devices",
                Some(&token),
                &json!({"token": device, "platform": "android"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let user = db
        .database
        .get_user_by_email("devices@example.com")
        .await
        .unwrap()
        .unwrap();

    // The push provider reported the first token as dead
    db.database
        .prune_device_token(user.id, "fcm-token-stale")
        .await
        .unwrap();

    let (status, body) = send(&app, get("/notifications/devices", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let devices = body["data"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["token"], "fcm-token-live");
}
