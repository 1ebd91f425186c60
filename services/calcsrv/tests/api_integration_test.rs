//! API integration tests
//!
//! Drive the full router against a private in-memory SQLite database.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use calcsrv::{create_routes, AppState, CalcsrvConfig};
use common::sqlite::SqliteClient;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const SECRET: &str = "integration-test-secret-0123456789";

fn test_config() -> CalcsrvConfig {
    let mut config = CalcsrvConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.auth.bcrypt_cost = calcsrv::auth::password::MIN_COST;
    config.evaluator.max_expression_len = 64;
    config
}

async fn test_app_with(config: CalcsrvConfig) -> (Router, SqliteClient) {
    let db = SqliteClient::in_memory().await.unwrap();
    let state = AppState::build(config, db.clone()).await.unwrap();
    (create_routes(state), db)
}

async fn test_app() -> Router {
    test_app_with(test_config()).await.0
}

/// Helper to make JSON requests
async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => Body::from(serde_json::to_vec(&json).unwrap()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, value)
}

async fn register(app: &Router, login: &str, password: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({"login": login, "password": password})),
    )
    .await
}

async fn login(app: &Router, login: &str, password: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/api/v1/login",
        None,
        Some(json!({"login": login, "password": password})),
    )
    .await
}

async fn signed_in(app: &Router, name: &str) -> String {
    let (status, _) = register(app, name, "password").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(app, name, "password").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn calculate(app: &Router, token: Option<&str>, expression: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/api/v1/calculate",
        token,
        Some(json!({"expression": expression})),
    )
    .await
}

async fn history(app: &Router, token: Option<&str>) -> (StatusCode, Value) {
    json_request(app, "GET", "/api/v1/calculations", token, None).await
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = json_request(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "calcsrv");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["checks"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = test_app().await;

    let (status, body) = register(&app, "alice", "s3cret").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "User registered successfully"}));

    let (status, body) = login(&app, "alice", "s3cret").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app().await;

    let (status, body) = register(&app, "", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["error_code"], "CALCSRV_INVALID_REQUEST");

    let (status, _) = register(&app, "bob", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, &"x".repeat(65), "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app().await;
    assert_eq!(register(&app, "alice", "one").await.0, StatusCode::OK);

    let (status, body) = register(&app, "alice", "two").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["error_code"], "CALCSRV_USER_EXISTS");

    // First password still works
    assert_eq!(login(&app, "alice", "one").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_credentials_unauthorized() {
    let app = test_app().await;
    register(&app, "alice", "right").await;

    let (wrong_status, wrong_body) = login(&app, "alice", "wrong").await;
    let (unknown_status, unknown_body) = login(&app, "nobody", "right").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"]["message"], unknown_body["error"]["message"]);
}

#[tokio::test]
async fn test_calculate_persists_and_lists() {
    let app = test_app().await;
    let token = signed_in(&app, "alice").await;

    let (status, body) = calculate(&app, Some(&token), "2+2*2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "2+2*2");
    assert_eq!(body["result"], "6");
    assert!(body["record_id"].is_i64());
    assert!(body.get("error").is_none());

    let (status, body) = calculate(&app, Some(&token), "(2+2)*2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "8");

    let (status, body) = calculate(&app, Some(&token), "7/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "3.5");

    let (status, body) = history(&app, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    let expressions: Vec<&str> = entries
        .iter()
        .map(|e| e["expression"].as_str().unwrap())
        .collect();
    assert_eq!(expressions, vec!["2+2*2", "(2+2)*2", "7/2"]);
    assert_eq!(entries[0]["result"], "6");
    assert!(entries[0]["created_at"].is_string());
}

#[tokio::test]
async fn test_failed_evaluation_returns_error_without_record() {
    let app = test_app().await;
    let token = signed_in(&app, "alice").await;

    for (expression, kind) in [
        ("1/0", "division_by_zero"),
        ("2++2", "syntax_error"),
        ("2(3+4)", "syntax_error"),
        ("", "syntax_error"),
    ] {
        let (status, body) = calculate(&app, Some(&token), expression).await;
        assert_eq!(status, StatusCode::OK, "{}", expression);
        assert!(body["result"].is_null());
        assert!(body["record_id"].is_null());
        assert_eq!(body["error"]["kind"], kind, "{}", expression);
        assert!(body["error"]["message"].is_string());
    }

    let (_, body) = history(&app, Some(&token)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_expression() {
    let app = test_app().await;
    let token = signed_in(&app, "alice").await;

    let long = "1+".repeat(40) + "1";
    let (status, body) = calculate(&app, Some(&token), &long).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["kind"], "input_too_large");
    assert!(body["record_id"].is_null());
}

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let app = test_app().await;

    let (status, body) = calculate(&app, None, "1+1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["error_code"], "CALCSRV_UNAUTHENTICATED");

    let (status, _) = calculate(&app, Some("garbage"), "1+1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = history(&app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = test_app().await;
    signed_in(&app, "alice").await;

    let mut other = test_config();
    other.auth.jwt_secret = "a-completely-different-secret".to_string();
    let (other_app, _) = test_app_with(other).await;
    let foreign = signed_in(&other_app, "alice").await;

    let (status, _) = calculate(&app, Some(&foreign), "1+1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_history_is_per_user() {
    let app = test_app().await;
    let alice = signed_in(&app, "alice").await;
    let bob = signed_in(&app, "bob").await;

    calculate(&app, Some(&alice), "1+1").await;
    calculate(&app, Some(&bob), "2*3").await;
    calculate(&app, Some(&alice), "10-4").await;

    let (_, alice_history) = history(&app, Some(&alice)).await;
    let (_, bob_history) = history(&app, Some(&bob)).await;

    let results = |v: &Value| -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|e| e["result"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(results(&alice_history), vec!["2", "6"]);
    assert_eq!(results(&bob_history), vec!["6"]);
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let (app, db) = test_app_with(test_config()).await;
    let token = signed_in(&app, "alice").await;

    sqlx::query("DROP TABLE calculations")
        .execute(db.pool())
        .await
        .unwrap();

    let (status, body) = calculate(&app, Some(&token), "1+1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Internal server error");

    // A failing expression never touches the store
    let (status, body) = calculate(&app, Some(&token), "1/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["kind"], "division_by_zero");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = test_app().await;
    let token = signed_in(&app, "alice").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/calculate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) =
        json_request(&app, "POST", "/api/v1/calculate", Some(&token), Some(json!({"expr": "1"})))
            .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["error_code"], "CALCSRV_INVALID_REQUEST");
}

#[tokio::test]
async fn test_unauthenticated_checked_before_body() {
    let (app, db) = test_app_with(test_config()).await;

    for body in ["{not json", "", r#"{"expr": "1"}"#] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/calculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "body {:?}", body);
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = test_config();
    config.api.body_limit = 128;
    let (app, _) = test_app_with(config).await;

    let (status, _) = register(&app, "alice", &"p".repeat(1024)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_admin_routes_hidden_by_default() {
    let app = test_app().await;
    let (status, _) = json_request(&app, "GET", "/api/v1/admin/log-level", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_log_level_without_reload_support() {
    let mut config = test_config();
    config.api.enable_admin = true;
    let (app, _) = test_app_with(config).await;

    let (status, body) = json_request(&app, "GET", "/api/v1/admin/log-level", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "unknown");

    // This test binary never installs the global subscriber
    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/v1/admin/log-level",
        None,
        Some(json!({"level": "debug"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
