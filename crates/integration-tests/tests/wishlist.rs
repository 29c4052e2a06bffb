//! Integration tests for the wishlist.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use bettabeal_integration_tests::{MISSING_WISHLIST_ENTRY, TestApp, WISHLIST_LEN};
use serde_json::{Value, json};

#[tokio::test]
async fn test_wishlist_refreshes_products_and_paginates() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app.client.get(app.at("/wishlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();

    assert_eq!(view["items"].as_array().unwrap().len(), 8);
    assert_eq!(view["page"], 1);
    assert_eq!(view["total_pages"], 2);

    // Entry 1 picks up the current detail; the rest keep their saved copy.
    assert_eq!(view["items"][0]["wishlist_id"], 1);
    assert_eq!(view["items"][0]["product_name"], "Betta Halfmoon");
    assert_eq!(view["items"][0]["price"], "Rp10.000");
    assert_eq!(view["items"][1]["product_name"], "Saved 202");
    assert_eq!(view["items"][1]["price"], "Rp9.000");

    let refreshes = app
        .upstream
        .calls()
        .into_iter()
        .filter(|call| call.method == Method::GET && call.path.starts_with("/api/products/"))
        .count();
    assert_eq!(refreshes, usize::try_from(WISHLIST_LEN).unwrap());

    let response = app
        .client
        .get(app.at("/wishlist?page=2"))
        .send()
        .await
        .unwrap();
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["items"].as_array().unwrap().len(), 1);
    assert_eq!(view["items"][0]["wishlist_id"], 9);
}

#[tokio::test]
async fn test_wishlist_failure_shows_empty_list() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.upstream.fail(
        Method::GET,
        "/api/wishlist",
        1,
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "Server Error" }),
    );

    let response = app.client.get(app.at("/wishlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["items"], json!([]));
    assert_eq!(view["total_pages"], 0);
}

#[tokio::test]
async fn test_stale_token_on_wishlist_redirects_to_login() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.upstream.fail(
        Method::GET,
        "/api/wishlist",
        1,
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Unauthenticated." }),
    );

    let response = app.client.get(app.at("/wishlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_remove_from_wishlist() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app.client.delete(app.at("/wishlist/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["removed"], 3);
    assert_eq!(
        view["toasts"],
        json!([{ "level": "success", "message": "Product removed from wishlist." }])
    );

    let calls = app.upstream.calls_to(&Method::DELETE, "/api/wishlist/3");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer tok-fixture"));
}

#[tokio::test]
async fn test_failed_removal_shows_error_toast() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app
        .client
        .delete(app.at(&format!("/wishlist/{MISSING_WISHLIST_ENTRY}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["removed"], Value::Null);
    assert_eq!(
        view["toasts"],
        json!([{ "level": "error", "message": "Failed to remove product from wishlist" }])
    );
}
