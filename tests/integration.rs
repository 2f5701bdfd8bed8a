use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use haulboard::api::rest::router;
use haulboard::config::Config;
use haulboard::notify::{run_notifier, LifecycleEvent};
use haulboard::state::AppState;
use haulboard::store::MemoryBackend;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

const EMPTY_BLOB: &str = r#"{"jobs":[],"users":[]}"#;

fn test_config() -> Config {
    Config {
        store_latency_ms: 0,
        ..Config::default()
    }
}

fn empty_state() -> (Arc<AppState>, mpsc::Receiver<LifecycleEvent>) {
    let (state, event_rx) = AppState::new(
        &test_config(),
        Box::new(MemoryBackend::preloaded(EMPTY_BLOB)),
        Box::new(MemoryBackend::new()),
    );
    (Arc::new(state), event_rx)
}

fn setup() -> (axum::Router, mpsc::Receiver<LifecycleEvent>) {
    let (state, event_rx) = empty_state();
    (router(state), event_rx)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn job_body(payout: f64) -> Value {
    json!({
        "title": "Antique Oak Dresser",
        "description": "Heavy solid wood dresser. Needs two people or a dolly.",
        "pickup_location": "123 Maple St, Downtown",
        "dropoff_location": "456 Oak Ln, Suburbs",
        "payout": payout,
        "vehicle_type": "Pickup",
        "distance_miles": 12.0
    })
}

async fn create_job(app: &axum::Router, payout: f64) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/jobs", job_body(payout)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn signed_up_user(app: &axum::Router, name: &str, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({ "name": name, "email": email, "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let challenge = body_json(response).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({
                "challenge_id": challenge["challenge_id"],
                "code": "123456"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _event_rx) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["jobs"], 0);
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn fresh_backend_is_seeded_with_starter_jobs() {
    let (state, _event_rx) = AppState::new(
        &test_config(),
        Box::new(MemoryBackend::new()),
        Box::new(MemoryBackend::new()),
    );
    let app = router(Arc::new(state));

    let response = app.oneshot(get_request("/jobs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _event_rx) = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("jobs_created_total"));
    assert!(body.contains("notices_in_queue"));
}

#[tokio::test]
async fn create_job_computes_fee_and_starts_pending() {
    let (app, _event_rx) = setup();
    let body = create_job(&app, 65.0).await;

    assert_eq!(body["status"], "Pending");
    assert_eq!(body["payout"], 65.0);
    assert_eq!(body["platform_fee"], 10.0);
    assert_eq!(body["driver_confirmed"], false);
    assert_eq!(body["requester_confirmed"], false);
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_job_empty_title_returns_400() {
    let (app, _event_rx) = setup();
    let mut body = job_body(65.0);
    body["title"] = json!("   ");

    let response = app
        .oneshot(json_request("POST", "/jobs", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_job_negative_payout_returns_400() {
    let (app, _event_rx) = setup();
    let response = app
        .oneshot(json_request("POST", "/jobs", job_body(-5.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_nonexistent_job_returns_404() {
    let (app, _event_rx) = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/jobs/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_escrow_flow() {
    let (app, _event_rx) = setup();
    let job = create_job(&app, 65.0).await;
    let id = job["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request("POST", &format!("/jobs/{id}/accept"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = body_json(response).await;
    assert_eq!(accepted["status"], "Accepted");

    // A second acceptance must not silently succeed.
    let response = app
        .clone()
        .oneshot(json_request("POST", &format!("/jobs/{id}/accept"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{id}/confirm"),
            json!({ "role": "Driver" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let half_confirmed = body_json(response).await;
    assert_eq!(half_confirmed["status"], "Accepted");
    assert_eq!(half_confirmed["driver_confirmed"], true);
    assert_eq!(half_confirmed["requester_confirmed"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{id}/confirm"),
            json!({ "role": "Requester" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert_eq!(completed["status"], "Completed");
    assert_eq!(completed["driver_confirmed"], true);
    assert_eq!(completed["requester_confirmed"], true);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{id}/rating"),
            json!({ "role": "Requester", "score": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rated = body_json(response).await;
    assert_eq!(rated["rating_for_driver"], 5);
    assert!(rated["rating_for_requester"].is_null());
}

#[tokio::test]
async fn confirm_before_accept_returns_409() {
    let (app, _event_rx) = setup();
    let job = create_job(&app, 40.0).await;
    let id = job["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{id}/confirm"),
            json!({ "role": "Driver" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn rating_out_of_range_returns_400() {
    let (app, _event_rx) = setup();
    let job = create_job(&app, 40.0).await;
    let id = job["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/jobs/{id}/rating"),
            json!({ "role": "Driver", "score": 6 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_verify_and_logout_round_trip() {
    let (app, _event_rx) = setup();

    let user = signed_up_user(&app, "Ann Hauler", "ann@example.com").await;
    assert_eq!(user["name"], "Ann Hauler");
    assert_eq!(user["email"], "ann@example.com");
    assert_eq!(user["is_available"], true);

    let response = app
        .clone()
        .oneshot(get_request("/auth/session"))
        .await
        .unwrap();
    let session = body_json(response).await;
    assert_eq!(session["email"], "ann@example.com");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/logout", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get_request("/auth/session")).await.unwrap();
    let session = body_json(response).await;
    assert!(session.is_null());
}

#[tokio::test]
async fn verify_rejects_malformed_codes() {
    let (app, _event_rx) = setup();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({ "name": "Ann", "email": "ann@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    let challenge = body_json(response).await;

    for code in ["123", "12345a", "1234567"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/verify",
                json!({ "challenge_id": challenge["challenge_id"], "code": code }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // A malformed code does not burn the challenge.
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({ "challenge_id": challenge["challenge_id"], "code": "000000" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_signup_returns_409_and_leaves_users_unchanged() {
    let (app, _event_rx) = setup();
    signed_up_user(&app, "Ann", "ann@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/signup",
            json!({ "name": "Impostor", "email": "ANN@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["users"], 1);
}

#[tokio::test]
async fn login_with_unknown_email_returns_404() {
    let (app, _event_rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sso_yields_a_guest_session() {
    let (app, _event_rx) = setup();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/sso",
            json!({ "provider": "Google" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let challenge = body_json(response).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({ "challenge_id": challenge["challenge_id"], "code": "654321" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = body_json(response).await;
    assert_eq!(user["name"], "Google User");

    // Guests never land in the user collection.
    let response = app.oneshot(get_request("/health")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["users"], 0);
}

#[tokio::test]
async fn availability_toggle_updates_the_stored_user() {
    let (app, _event_rx) = setup();
    let user = signed_up_user(&app, "Dan Driver", "dan@example.com").await;
    let id = user["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/users/{id}/availability"),
            json!({ "is_available": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_available"], false);
}

#[tokio::test]
async fn analysis_without_credentials_returns_the_deterministic_fallback() {
    let (app, _event_rx) = setup();

    let request = json!({
        "description": "A heavy oak dresser with a mirror",
        "distance_miles": 12.0
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/analysis", request.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;

    assert_eq!(first["vehicle_type"], "Pickup");
    assert_eq!(first["estimated_weight_lb"], 150.0);
    assert_eq!(first["suggested_price"], 45.0);

    let response = app
        .oneshot(json_request("POST", "/analysis", request))
        .await
        .unwrap();
    let second = body_json(response).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn posting_a_job_fans_out_a_driver_notice() {
    let (state, event_rx) = empty_state();
    tokio::spawn(run_notifier(state.clone(), event_rx));
    let app = router(state.clone());

    let mut notices = state.notice_tx.subscribe();

    create_job(&app, 65.0).await;

    let notice = tokio::time::timeout(std::time::Duration::from_secs(2), notices.recv())
        .await
        .expect("notice not dispatched in time")
        .unwrap();

    assert_eq!(notice.title, "New haul alert");
    assert_eq!(
        serde_json::to_value(&notice.audience).unwrap(),
        json!("Driver")
    );
    assert_eq!(notice.auto_dismiss_ms, 6_000);
}
