//! Integration tests for login, sign-up, logout and the session gate.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode, header};
use bettabeal_integration_tests::TestApp;
use serde_json::{Value, json};

fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(String::from)
        .collect()
}

fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

// =============================================================================
// Session Gate
// =============================================================================

#[tokio::test]
async fn test_protected_routes_redirect_without_calling_upstream() {
    let app = TestApp::spawn().await;

    let requests = [
        (Method::GET, "/cart"),
        (Method::POST, "/cart/items/1/increment"),
        (Method::GET, "/addresses"),
        (Method::GET, "/checkout/55"),
        (Method::POST, "/checkout/55/payment"),
        (Method::GET, "/orders"),
        (Method::GET, "/wishlist"),
        (Method::DELETE, "/wishlist/1"),
        (Method::GET, "/dashboard/orders"),
    ];

    for (method, path) in requests {
        let response = app
            .client
            .request(method.clone(), app.at(path))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method} {path}");
        assert_eq!(location(&response), Some("/login"), "{method} {path}");
    }

    assert_eq!(app.upstream.total_calls(), 0);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.at("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_sets_strict_session_cookies() {
    let app = TestApp::spawn().await;

    let response = app.login_as("buyer").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let cookies = set_cookies(&response);
    let usr = cookies.iter().find(|c| c.starts_with("USR=")).unwrap();
    let uid = cookies.iter().find(|c| c.starts_with("UID=")).unwrap();
    assert!(usr.starts_with("USR=tok-fixture"));
    assert!(uid.starts_with("UID=7"));
    for cookie in [usr, uid] {
        assert!(cookie.contains("SameSite=Strict"), "{cookie}");
        assert!(cookie.contains("Max-Age=3600"), "{cookie}");
        // Plain-HTTP deployment
        assert!(!cookie.contains("Secure"), "{cookie}");
    }

    let login = app.upstream.calls_to(&Method::POST, "/api/login");
    assert_eq!(login.len(), 1);
    assert_eq!(login[0].body["username"], "buyer");
}

#[tokio::test]
async fn test_seller_lands_on_dashboard() {
    let app = TestApp::spawn().await;

    let response = app.login_as("seller").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_rejected_login_sets_no_cookies() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.at("/login"))
        .json(&json!({ "username": "buyer", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).iter().all(|c| !c.starts_with("USR=")));

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Login failed, please check your username/password!"
    );
}

#[tokio::test]
async fn test_logout_expires_cookies_and_closes_session() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app.client.get(app.at("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.client.post(app.at("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("USR=") && c.contains("1970")));
    assert!(cookies.iter().any(|c| c.starts_with("UID=") && c.contains("1970")));

    let calls_before = app.upstream.total_calls();
    let response = app.client.get(app.at("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.upstream.total_calls(), calls_before);
}

// =============================================================================
// Sign-up
// =============================================================================

fn sign_up(username: &str) -> Value {
    json!({
        "full_name": "Budi Santoso",
        "username": username,
        "birth_date": "2000-02-29",
        "phone_number": "081234567890",
        "email": "budi@example.com",
        "password": "rahasia",
    })
}

#[tokio::test]
async fn test_registration_signs_customer_in() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.at("/register"))
        .json(&sign_up("budi"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("USR=tok-registered")));
    assert!(cookies.iter().any(|c| c.starts_with("UID=20")));

    let calls = app.upstream.calls_to(&Method::POST, "/api/register/customer");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["birth_date"], "2000-02-29");
    assert_eq!(calls[0].body["phone_number"], "081234567890");
    assert_eq!(calls[0].body["password"], "rahasia");

    // The new session opens protected pages.
    let response = app.client.get(app.at("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_registration_without_user_sets_token_only() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.at("/register"))
        .json(&sign_up("tokenonly"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("USR=tok-registered")));
    assert!(cookies.iter().all(|c| !c.starts_with("UID=")));
}

#[tokio::test]
async fn test_refused_registration_sets_no_cookies() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.at("/register"))
        .json(&sign_up("taken"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookies(&response).iter().all(|c| !c.starts_with("USR=")));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Registration failed, please check your details!");
}

#[tokio::test]
async fn test_registration_upstream_outage() {
    let app = TestApp::spawn().await;
    app.upstream.fail(
        Method::POST,
        "/api/register/customer",
        1,
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "Server Error" }),
    );

    let response = app
        .client
        .post(app.at("/register"))
        .json(&sign_up("budi"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "An error occurred. Please try again later.");
}

#[tokio::test]
async fn test_incomplete_registration_is_rejected_locally() {
    let app = TestApp::spawn().await;

    let mut form = sign_up("budi");
    form["email"] = json!("");
    let response = app
        .client
        .post(app.at("/register"))
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please fill the required fields");

    let mut form = sign_up("budi");
    form["phone_number"] = json!("0812-3456");
    let response = app
        .client
        .post(app.at("/register"))
        .json(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.upstream.count(&Method::POST, "/api/register/customer"), 0);
}
