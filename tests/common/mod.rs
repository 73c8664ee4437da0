#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use belt_gateway::{app, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// Gateway wired to `server` in development mode (no `Secure` flag).
pub fn gateway(server: &MockServer) -> Router {
    gateway_for(&server.uri())
}

pub fn gateway_for(base_url: &str) -> Router {
    let state = AppState::new(Config::new(base_url, true)).expect("Failed to build state");
    app(state)
}

/// Base URL that refuses connections.
pub fn unreachable_upstream() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body; `Null` when empty or not JSON.
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    pub fn assert_session_cleared(&self) {
        let cookies = self.set_cookies();
        assert_eq!(cookies.len(), 2, "expected both cookies, got {cookies:?}");
        assert!(cookies.iter().any(|c| c.starts_with("access_token=;") && c.contains("Max-Age=0")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;") && c.contains("Max-Age=0")));
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub async fn call(
    app: Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub const SESSION: &str = "access_token=t1; refresh_token=r1";
