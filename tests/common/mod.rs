use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use userguard::{app::build_app, state::AppState};

/// Full router over the in-memory store.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let app = build_app(state.clone());
        Self { app, state }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> StatusCode {
        let body = serde_json::json!({ "username": username, "email": email, "password": password });
        self.request("POST", "/register", None, Some(body)).await.0
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({ "username": username, "password": password });
        self.request("POST", "/login", None, Some(body)).await
    }

    /// Registers `username` and returns a token for it.
    pub async fn token_for(&self, username: &str) -> String {
        let email = format!("{username}@x.com");
        assert_eq!(self.register(username, &email, "p").await, StatusCode::CREATED);
        let (status, body) = self.login(username, "p").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}
