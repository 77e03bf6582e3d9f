mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;

#[tokio::test]
async fn health_check_is_public() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/healthz", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn openapi_document_lists_every_route() {
    let ctx = TestContext::new().await;

    let response = ctx
        .request(Method::GET, "/docs/openapi.json", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let paths = response.body["paths"].as_object().unwrap();
    for path in ["/signup", "/login", "/refresh", "/books", "/books/{isbn}"] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(response.body["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/healthz", None, None).await;

    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn registry_holds_auth_and_books() {
    let ctx = TestContext::new().await;

    assert_eq!(ctx.app.registry.core_module_count(), 1);
    assert_eq!(ctx.app.registry.custom_module_count(), 1);
    assert!(ctx.app.registry.get_module("books").is_some());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx.request(Method::GET, "/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
