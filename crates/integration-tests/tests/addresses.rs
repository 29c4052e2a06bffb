//! Integration tests for address management and area search.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use bettabeal_integration_tests::{DESTINATION_AREA, TestApp};
use serde_json::{Value, json};

async fn logged_in() -> TestApp {
    let app = TestApp::spawn().await;
    app.login().await;
    app
}

#[tokio::test]
async fn test_list_preselects_main_address() {
    let app = logged_in().await;

    let response = app.client.get(app.at("/addresses")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["selected"], 3);
    assert_eq!(view["addresses"][0]["biteship_id"], DESTINATION_AREA);
}

#[tokio::test]
async fn test_create_trims_input() {
    let app = logged_in().await;

    let response = app
        .client
        .post(app.at("/addresses"))
        .json(&json!({
            "name": "  Kantor ",
            "address": "Jl. Melati 2",
            "district_id": 4,
            "phone_number": " 081234567890 ",
            "is_main": false,
            "biteship_id": "",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = app.upstream.calls_to(&Method::POST, "/api/addresses");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].body["name"], "Kantor");
    assert_eq!(created[0].body["district_id"], 4);
    assert!(created[0].body["biteship_id"].is_null());
    assert_eq!(created[0].body["phone_number"], "081234567890");
}

#[tokio::test]
async fn test_create_with_missing_fields_is_rejected_locally() {
    let app = logged_in().await;

    let response = app
        .client
        .post(app.at("/addresses"))
        .json(&json!({
            "name": "",
            "address": "Jl. Melati 2",
            "phone_number": "081234567890",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please fill the required fields");
    assert_eq!(app.upstream.count(&Method::POST, "/api/addresses"), 0);
}

#[tokio::test]
async fn test_create_rejects_formatted_phone() {
    let app = logged_in().await;

    let response = app
        .client
        .post(app.at("/addresses"))
        .json(&json!({
            "name": "Kantor",
            "address": "Jl. Melati 2",
            "district_id": 4,
            "phone_number": "+62 812-3456-7890",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.upstream.count(&Method::POST, "/api/addresses"), 0);
}

#[tokio::test]
async fn test_area_search_is_cached() {
    let app = logged_in().await;

    for input in ["Tebet", "tebet"] {
        let response = app
            .client
            .get(app.at("/addresses/areas"))
            .query(&[("input", input)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let areas: Value = response.json().await.unwrap();
        assert_eq!(areas[0]["id"], DESTINATION_AREA);
    }

    assert_eq!(app.upstream.count(&Method::GET, "/v1/maps/areas"), 1);
}

#[tokio::test]
async fn test_blank_area_search_skips_upstream() {
    let app = logged_in().await;

    let response = app
        .client
        .get(app.at("/addresses/areas?input=%20"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let areas: Value = response.json().await.unwrap();
    assert_eq!(areas, json!([]));
    assert_eq!(app.upstream.count(&Method::GET, "/v1/maps/areas"), 0);
}

#[tokio::test]
async fn test_area_search_failure_yields_no_suggestions() {
    let app = logged_in().await;
    app.upstream.fail(
        Method::GET,
        "/v1/maps/areas",
        1,
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "maps down" }),
    );

    let response = app
        .client
        .get(app.at("/addresses/areas?input=Tebet"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let areas: Value = response.json().await.unwrap();
    assert_eq!(areas, json!([]));

    // Failures are not cached: the next search reaches the API again
    let response = app
        .client
        .get(app.at("/addresses/areas?input=Tebet"))
        .send()
        .await
        .unwrap();
    let areas: Value = response.json().await.unwrap();
    assert_eq!(areas[0]["id"], DESTINATION_AREA);
    assert_eq!(app.upstream.count(&Method::GET, "/v1/maps/areas"), 2);
}

#[tokio::test]
async fn test_show_update_and_delete_address() {
    let app = logged_in().await;

    let response = app.client.get(app.at("/addresses/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let address: Value = response.json().await.unwrap();
    assert_eq!(address["name"], "Rumah");
    assert_eq!(address["is_main"], true);

    let response = app
        .client
        .put(app.at("/addresses/3"))
        .json(&json!({
            "name": "Rumah Baru",
            "address": "Jl. Mawar 10",
            "district_id": 1,
            "poscode_id": 4,
            "phone_number": "081234567890",
            "is_main": true,
            "biteship_id": DESTINATION_AREA,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["toasts"][0]["message"], "Address updated");

    let updates = app.upstream.calls_to(&Method::PUT, "/api/addresses/3");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].body["name"], "Rumah Baru");
    assert_eq!(updates[0].body["poscode_id"], 4);

    let response = app.client.delete(app.at("/addresses/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: Value = response.json().await.unwrap();
    assert_eq!(view["toasts"][0]["message"], "Address deleted");
    assert_eq!(app.upstream.count(&Method::DELETE, "/api/addresses/3"), 1);
}

#[tokio::test]
async fn test_update_with_missing_fields_is_rejected_locally() {
    let app = logged_in().await;

    let response = app
        .client
        .put(app.at("/addresses/3"))
        .json(&json!({ "name": "Rumah", "phone_number": "081234567890" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.upstream.count(&Method::PUT, "/api/addresses/3"), 0);
}

#[tokio::test]
async fn test_districts_and_postcodes() {
    let app = logged_in().await;

    let response = app
        .client
        .get(app.at("/addresses/districts"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let districts: Value = response.json().await.unwrap();
    assert_eq!(districts.as_array().unwrap().len(), 2);
    assert_eq!(districts[0]["district_name"], "Tebet");

    let response = app
        .client
        .get(app.at("/addresses/districts/1/postcodes"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let postcodes: Value = response.json().await.unwrap();
    assert_eq!(postcodes, json!([{ "poscode_id": 4, "code": "12410" }]));
    assert_eq!(
        app.upstream.count(&Method::GET, "/api/districts/1/poscodes"),
        1
    );
}
