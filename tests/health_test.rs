mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

#[tokio::test]
async fn index_returns_banner() {
    let app = common::test_app().await;
    let (status, body) = common::get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Index for Game/Review/User API");
}

#[tokio::test]
async fn health_returns_200() {
    let app = common::test_app().await;
    let (status, body) = common::get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);

    let json = common::json(&body);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    // SQLite in-memory should report connected
    assert_eq!(json["database"]["connected"], true);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::test_app().await;
    let (status, _body) = common::get(&app, "/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_allowed_outside_production() {
    let app = common::test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/users")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap_or_default();
    let response = app.oneshot(request).await.unwrap_or_default();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
