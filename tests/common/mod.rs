#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use folio_app::App;
use folio_kernel::settings::Settings;
use serde_json::Value;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-of-32-bytes!";

pub struct TestContext {
    pub app: App,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestContext {
    pub async fn new() -> TestContext {
        let mut settings = Settings::default();
        settings.database.url = "sqlite::memory:".to_string();
        settings.auth.jwt_secret = SECRET.to_string();
        settings.auth.bcrypt_cost = 4;

        let app = App::build(settings)
            .await
            .expect("failed to build test app");
        TestContext { app }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn signup(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/signup",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Sign up `username` and return its access token
    pub async fn access_token(&self, username: &str) -> String {
        self.signup(username, "password123").await;
        let response = self.login(username, "password123").await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["token"].as_str().unwrap().to_string()
    }
}
