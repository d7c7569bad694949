//! Helpers for driving the full router in handler tests.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, String) {
    let res = build_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn call(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();
    send(state, req).await
}

pub async fn call_multipart(
    state: &AppState,
    uri: &str,
    token: &str,
    field: &str,
    content_type: &str,
    data: &[u8],
) -> (StatusCode, String) {
    const BOUNDARY: &str = "linkcard-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"upload\"\r\nContent-Type: {ct}\r\n\r\n",
            b = BOUNDARY,
            f = field,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    send(state, req).await
}

pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    handle: &str,
) -> (StatusCode, String) {
    call(
        state,
        "POST",
        "/register",
        None,
        Some(json!({ "email": email, "password": password, "handle": handle, "name": "Test User" })),
    )
    .await
}

/// Logs in and returns the token; panics if login fails.
pub async fn login(state: &AppState, email: &str, password: &str) -> String {
    let (status, token) = call(
        state,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", token);
    token
}
