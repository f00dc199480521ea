use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    routing::get,
};
use tower::ServiceExt;

async fn ok_handler() -> &'static str {
    "ok"
}

async fn fail_handler() -> Result<&'static str, bg_removal_service::AppError> {
    Err(bg_removal_service::AppError::no_image_provided())
}

async fn echo_handler() -> String {
    bg_removal_service::request_id::current_request_id().unwrap_or_default()
}

fn build_app() -> Router {
    Router::new()
        .route("/ok", get(ok_handler))
        .route("/fail", get(fail_handler))
        .route("/echo", get(echo_handler))
        .layer(axum::middleware::from_fn(
            bg_removal_service::request_id::request_id_middleware,
        ))
}

fn header_of(resp: &axum::response::Response) -> String {
    resp.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn request_id_is_generated_when_missing() {
    let resp = build_app()
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .expect("request /ok");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header_of(&resp).starts_with("req_"));
}

#[tokio::test]
async fn request_id_uses_client_value_when_valid() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header("x-request-id", "client.req-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /ok");

    assert_eq!(header_of(&resp), "client.req-001");
}

#[tokio::test]
async fn invalid_client_value_is_replaced() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header("x-request-id", "bad id with spaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /ok");

    assert!(header_of(&resp).starts_with("req_"));
}

#[tokio::test]
async fn handlers_see_the_same_request_id() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .uri("/echo")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /echo");

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(&body[..], b"trace-42");
}

#[tokio::test]
async fn error_body_is_not_polluted_by_request_id() {
    let resp = build_app()
        .oneshot(
            Request::builder()
                .uri("/fail")
                .header("x-request-id", "err.req-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("request /fail");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header_of(&resp), "err.req-001");

    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("parse json");
    assert_eq!(json, serde_json::json!({ "error": "No image file provided" }));
}
