#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use tower::ServiceExt;

use game_reviews_api::config::{Config, Environment};
use game_reviews_api::state::AppState;

/// Build the full application, middleware included, over a fresh in-memory `SQLite` database.
pub async fn test_app() -> Router {
    let db = game_reviews_api::db::connect("sqlite::memory:")
        .await
        .unwrap_or_default();
    Migrator::up(&db, None).await.unwrap_or_default();

    let state = AppState {
        db,
        config: Config {
            database_url: "sqlite::memory:".to_string(),
            server_host: std::net::IpAddr::from([127, 0, 0, 1]),
            server_port: 0,
            environment: Environment::Development,
            log_level: "warn".to_string(),
            run_migrations: true,
            cors_origins: Vec::new(),
        },
    };

    game_reviews_api::app::build(state)
}

/// Send an arbitrary request and return (status, body).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body_str = String::from_utf8(body.to_vec()).unwrap_or_default();

    (status, body_str)
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap_or_default()
}

/// Test helper: send a GET request to the app and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_default();
    send(app, request).await
}

/// Test helper: send a DELETE request and return (status, body).
pub async fn delete(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_default();
    send(app, request).await
}

/// Test helper: POST a form-encoded body and return (status, body).
pub async fn post_form(app: &Router, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, String) {
    send(app, form_request("POST", uri, fields)).await
}

/// Test helper: PATCH a form-encoded body and return (status, body).
pub async fn patch_form(app: &Router, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, String) {
    send(app, form_request("PATCH", uri, fields)).await
}

/// Parse a response body, falling back to `Null` so assertions report the mismatch.
pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or(serde_json::Value::Null)
}

/// Create a user and return its id.
pub async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body) = post_form(app, "/users", &[("name", name)]).await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
    json(&body)["id"].as_i64().unwrap_or_default()
}

/// Create a game and return its id.
pub async fn create_game(app: &Router, title: &str) -> i64 {
    let (status, body) = post_form(
        app,
        "/games",
        &[("title", title), ("genre", "Platformer"), ("platform", "PC"), ("price", "20")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create game failed: {body}");
    json(&body)["id"].as_i64().unwrap_or_default()
}

/// Create a review linking `user_id` to `game_id` and return its id.
pub async fn create_review(app: &Router, user_id: i64, game_id: i64, score: i32) -> i64 {
    let score = score.to_string();
    let game_id = game_id.to_string();
    let user_id = user_id.to_string();
    let (status, body) = post_form(
        app,
        "/reviews",
        &[
            ("score", score.as_str()),
            ("comment", "Solid"),
            ("game_id", game_id.as_str()),
            ("user_id", user_id.as_str()),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create review failed: {body}");
    json(&body)["id"].as_i64().unwrap_or_default()
}
