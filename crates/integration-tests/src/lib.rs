//! Integration test harness for the BettaBeal storefront.
//!
//! Each test spawns the real storefront router on an ephemeral port, pointed
//! at [`FakeUpstream`]: a single local server that answers both the REST
//! backend (`/api/...`) and the Biteship courier API (`/v1/...`) with canned
//! fixtures and records every call it receives.
//!
//! # Fixtures
//!
//! - Logins: `buyer`/`secret` (customer 7) and `seller`/`secret` (seller 8);
//!   `expired`/`secret` logs in with a token the backend no longer accepts
//! - Cart: two lines, `Betta Halfmoon` x2 (stock 3) and
//!   `Indian Almond Leaves` x1 (stock 10)
//! - Orders: [`CHECKOUT_ORDER`] is what `POST /api/orders` creates;
//!   [`ORDER_WITHOUT_SNAP_TOKEN`] and [`ORDER_WITHOUT_AREA`] exercise the
//!   failure paths; [`PAID_PROCESSING_ORDER`], [`PENDING_ORDER`] and
//!   [`PAID_SHIPPED_ORDER`] back the seller dashboard
//! - Couriers: `JNE Reguler` at Rp9.000 and `TIKI Economy` at Rp7.000
//! - Sign-up: any username except `taken` (refused) and `tokenonly`
//!   (token without a user) registers customer 20
//! - Catalog: three categories, one inactive; seven listed products, one
//!   inactive; product 10 carries two reviews
//! - Wishlist: [`WISHLIST_LEN`] entries; removing [`MISSING_WISHLIST_ENTRY`]
//!   fails
//!
//! Any endpoint can be made to fail a number of times with
//! [`FakeUpstream::fail`], which answers with the given status and body
//! instead of the fixture.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bettabeal_storefront::checkout::PaymentSuccessMode;
use bettabeal_storefront::config::{
    BackendConfig, BiteshipConfig, CheckoutConfig, DEFAULT_COURIERS, DEFAULT_ORIGIN_AREA_ID,
    StorefrontConfig,
};
use bettabeal_storefront::state::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Order created by `POST /api/orders`.
pub const CHECKOUT_ORDER: i64 = 55;
/// Order whose detail carries no snap token.
pub const ORDER_WITHOUT_SNAP_TOKEN: i64 = 56;
/// Order whose address was never geocoded.
pub const ORDER_WITHOUT_AREA: i64 = 57;
/// Paid order still being packed.
pub const PAID_PROCESSING_ORDER: i64 = 61;
/// Unpaid order.
pub const PENDING_ORDER: i64 = 62;
/// Paid order already with the courier.
pub const PAID_SHIPPED_ORDER: i64 = 63;

/// Orders in the customer's history (`GET /api/orders` without a page).
pub const HISTORY_LEN: i64 = 12;

/// Entries in the customer's wishlist.
pub const WISHLIST_LEN: i64 = 9;
/// Wishlist entry the backend does not know.
pub const MISSING_WISHLIST_ENTRY: i64 = 99;

/// Token handed out to the `expired` login.
pub const STALE_TOKEN: &str = "tok-stale";

/// Destination area of the fixture address.
pub const DESTINATION_AREA: &str = "IDNP6IDNC148IDND836IDZ12410";

/// One request received by the fake upstream.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// A canned failure answered instead of the fixture.
#[derive(Debug, Clone)]
struct ScriptedFailure {
    method: Method,
    path: String,
    remaining: usize,
    status: StatusCode,
    body: Value,
}

#[derive(Clone, Default)]
struct Shared {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failures: Arc<Mutex<Vec<ScriptedFailure>>>,
}

impl Shared {
    /// Consume one scripted failure for the request, if any is left.
    fn take_failure(&self, method: &Method, path: &str) -> Option<Response> {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let failure = failures
            .iter_mut()
            .find(|f| f.method == *method && f.path == path && f.remaining > 0)?;
        failure.remaining -= 1;
        Some((failure.status, Json(failure.body.clone())).into_response())
    }
}

/// Fake BettaBeal backend and Biteship API on one local port.
#[derive(Clone)]
pub struct FakeUpstream {
    addr: SocketAddr,
    shared: Shared,
}

impl FakeUpstream {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let shared = Shared::default();
        let router = Router::new().fallback(upstream).with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let addr = listener.local_addr().expect("Fake upstream has no address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Fake upstream crashed");
        });

        Self { addr, shared }
    }

    /// Answer the next `times` calls to `method path` with `status` and
    /// `body` instead of the fixture.
    pub fn fail(&self, method: Method, path: &str, times: usize, status: StatusCode, body: Value) {
        self.shared
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ScriptedFailure {
                method,
                path: path.to_string(),
                remaining: times,
                status,
                body,
            });
    }

    /// Base URL of the fake.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.shared
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.shared
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Calls matching a method and exact path.
    #[must_use]
    pub fn calls_to(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == *method && call.path == path)
            .collect()
    }

    /// Number of calls matching a method and exact path.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.calls_to(method, path).len()
    }
}

/// A running storefront wired to a [`FakeUpstream`].
pub struct TestApp {
    pub url: String,
    pub upstream: FakeUpstream,
    /// Cookie-keeping client that does not follow redirects.
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a storefront that marks orders paid on payment success.
    pub async fn spawn() -> Self {
        Self::spawn_with(PaymentSuccessMode::MarkPaid).await
    }

    /// Spawn a storefront with the given payment-success behaviour.
    pub async fn spawn_with(on_payment_success: PaymentSuccessMode) -> Self {
        let upstream = FakeUpstream::start().await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        let url = format!("http://{addr}");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: url.clone(),
            session_max_age_seconds: 3600,
            backend: BackendConfig {
                base_url: upstream.url(),
            },
            biteship: BiteshipConfig {
                base_url: upstream.url(),
                api_token: "biteship-test-token".to_string().into(),
                origin_area_id: DEFAULT_ORIGIN_AREA_ID.to_string(),
                couriers: DEFAULT_COURIERS.to_string(),
            },
            checkout: CheckoutConfig { on_payment_success },
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config).expect("Failed to build application state");
        let app = bettabeal_storefront::app(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Storefront crashed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build test client");

        Self {
            url,
            upstream,
            client,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn at(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// Log in through the storefront, keeping the session cookies.
    pub async fn login_as(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.at("/login"))
            .json(&json!({ "username": username, "password": "secret" }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// Log in as the fixture customer.
    pub async fn login(&self) {
        let response = self.login_as("buyer").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "fixture login failed");
    }
}

// =============================================================================
// Fake upstream
// =============================================================================

async fn upstream(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    shared
        .calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedCall {
            method: method.clone(),
            path: uri.path().to_string(),
            query: uri.query().map(String::from),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(String::from),
            body: body.clone(),
        });

    if let Some(failure) = shared.take_failure(&method, uri.path()) {
        return failure;
    }

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "login"]) => login(&body),
        ("GET", ["api", "authentication"]) => authentication(&headers),

        ("GET", ["api", "cart"]) => by_status(cart()),
        ("POST", ["api", "cart", "add" | "update"])
        | ("PUT", ["api", "cart", "decrement", _])
        | ("DELETE", ["api", "cart", "items", _]) => by_status(Value::Null),
        ("GET", ["api", "products"]) => by_status(json!({ "current_page": 1, "data": listing() })),
        ("GET", ["api", "categories"]) => by_status(json!([
            { "category_id": 1, "category_name": "Ikan Cupang", "description": "Betta", "is_active": true },
            { "category_id": 2, "category_name": "Pakan", "description": null, "is_active": 0 },
            { "category_id": 3, "category_name": "Aksesoris", "is_active": 1 },
        ])),
        ("GET", ["api", "products", id]) => match *id {
            "10" => by_status(reviewed(product(10, "Betta Halfmoon", 10_000, 3))),
            "11" => by_status(product(11, "Indian Almond Leaves", 5_000, 10)),
            _ => not_found(),
        },

        ("GET", ["api", "wishlist"]) => by_status(wishlist()),
        ("DELETE", ["api", "wishlist", id])
            if id.parse::<i64>().ok() == Some(MISSING_WISHLIST_ENTRY) =>
        {
            not_found()
        }
        ("DELETE", ["api", "wishlist", _]) => by_status(Value::Null),

        ("POST", ["api", "register", "customer"]) => register(&body),

        ("POST", ["api", "orders"]) => by_code(json!({ "order_id": CHECKOUT_ORDER })),
        ("GET", ["api", "orders"]) if uri.query().is_some_and(|q| q.contains("page=")) => {
            by_code(seller_orders(uri.query().unwrap_or_default()))
        }
        ("GET", ["api", "orders"]) => by_code(json!({
            "orders": (100..100 + HISTORY_LEN)
                .map(|id| order(id, "success", Some("delivered")))
                .collect::<Vec<_>>(),
        })),
        ("GET", ["api", "orders", id]) => id
            .parse::<i64>()
            .ok()
            .and_then(order_by_id)
            .map_or_else(not_found, by_code),
        ("PUT", ["api", "orders", _] | ["api", "orders", _, "shipping-status"]) => {
            by_code(Value::Null)
        }

        ("GET", ["api", "addresses"]) => by_code(json!([address(Some(DESTINATION_AREA))])),
        ("POST", ["api", "addresses"]) => by_code(Value::Null),
        ("GET", ["api", "addresses", "3"]) => by_code(address(Some(DESTINATION_AREA))),
        ("PUT" | "DELETE", ["api", "addresses", "3"]) => by_code(Value::Null),
        ("GET", ["api", "districts"]) => by_code(json!([
            { "district_id": 1, "district_name": "Tebet" },
            { "district_id": 2, "district_name": "Setiabudi" },
        ])),
        ("GET", ["api", "districts", "1", "poscodes"]) => by_code(json!([
            { "poscode_id": 4, "code": "12410" },
        ])),

        ("POST", ["v1", "rates", "couriers"]) => Json(json!({
            "success": true,
            "pricing": [
                {
                    "courier_name": "JNE",
                    "courier_service_name": "Reguler",
                    "courier_service_code": "REG",
                    "duration": "1 - 2 days",
                    "price": 9000,
                },
                {
                    "courier_name": "TIKI",
                    "courier_service_name": "Economy",
                    "courier_service_code": "ECO",
                    "duration": "1 - 1",
                    "price": 7000,
                },
            ],
        }))
        .into_response(),
        ("GET", ["v1", "maps", "areas"]) => Json(json!({
            "success": true,
            "areas": [{ "id": DESTINATION_AREA, "name": "Tebet, Jakarta Selatan, DKI Jakarta. 12410" }],
        }))
        .into_response(),

        _ => not_found(),
    }
}

fn login(body: &Value) -> Response {
    let user = match (body["username"].as_str(), body["password"].as_str()) {
        (Some("buyer"), Some("secret")) => json!({ "user_id": 7, "role": "customer" }),
        (Some("seller"), Some("secret")) => json!({ "user_id": 8, "role": "seller" }),
        (Some("expired"), Some("secret")) => {
            return Json(json!({
                "token": STALE_TOKEN,
                "user": { "user_id": 9, "role": "seller" },
            }))
            .into_response();
        }
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response();
        }
    };
    Json(json!({ "token": "tok-fixture", "user": user })).into_response()
}

fn register(body: &Value) -> Response {
    match body["username"].as_str() {
        Some("taken") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "The username has already been taken." })),
        )
            .into_response(),
        Some("tokenonly") => Json(json!({ "token": "tok-registered" })).into_response(),
        _ => (
            StatusCode::CREATED,
            Json(json!({
                "token": "tok-registered",
                "user": { "user_id": 20, "role": "customer" },
            })),
        )
            .into_response(),
    }
}

fn authentication(headers: &HeaderMap) -> Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if bearer == Some(STALE_TOKEN) {
        return Json(json!({ "code": "401", "message": "Token expired" })).into_response();
    }
    by_code(json!({ "authenticated": true }))
}

/// Envelope used by the cart and product endpoints.
fn by_status(data: Value) -> Response {
    Json(json!({ "status": "success", "data": data })).into_response()
}

/// Envelope used by the order and address endpoints.
fn by_code(data: Value) -> Response {
    Json(json!({ "code": "000", "message": "OK", "data": data })).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response()
}

fn cart() -> Value {
    json!({
        "total_items": 3,
        "subtotal": "25000.00",
        "items": [
            {
                "cart_item_id": 1,
                "product": { "product_id": 10, "name": "Betta Halfmoon", "price": "10000.00" },
                "quantity": 2,
                "total_price": "20000.00",
            },
            {
                "cart_item_id": 2,
                "product": { "product_id": 11, "name": "Indian Almond Leaves", "price": "5000.00" },
                "quantity": 1,
                "total_price": "5000.00",
            },
        ],
    })
}

fn product(id: i64, name: &str, price: i64, stock: u32) -> Value {
    json!({
        "product_id": id,
        "product_name": name,
        "description": "",
        "price": price.to_string(),
        "stock_quantity": stock,
    })
}

fn reviewed(mut product: Value) -> Value {
    product["average_rating"] = json!(4.5);
    product["rating_breakdown"] = json!({ "4": 1, "5": 1 });
    product["reviews"] = json!([
        { "rating": 5, "comment": "Sehat dan aktif", "customer_name": "Sari" },
        { "rating": 4, "comment": null, "customer_name": "Andi" },
    ]);
    product
}

/// Public listing, ids 10..=16. Product 12 is inactive despite the best sales.
fn listing() -> Vec<Value> {
    [(10, 40), (11, 25), (12, 90), (13, 5), (14, 31), (15, 2), (16, 17)]
        .into_iter()
        .map(|(id, sales)| {
            let mut listed = product(id, &format!("Listed {id}"), 15_000, 5);
            listed["total_sales"] = json!(sales);
            listed["is_active"] = json!(id != 12);
            listed["created_at"] = json!("2024-01-01 00:00:00");
            listed["category"] = json!({ "category_name": "Ikan Cupang" });
            listed
        })
        .collect()
}

/// Wishlist entries 1..=9. Entry 1 embeds a stale price for product 10;
/// the others point at products the backend no longer details.
fn wishlist() -> Value {
    (1..=WISHLIST_LEN)
        .map(|id| {
            let product_id = if id == 1 { 10 } else { 200 + id };
            json!({
                "wishlist_id": id,
                "product": product(product_id, &format!("Saved {product_id}"), 9_000, 1),
            })
        })
        .collect()
}

fn address(area: Option<&str>) -> Value {
    json!({
        "address_id": 3,
        "name": "Rumah",
        "address": "Jl. Mawar 1",
        "district_id": 1,
        "poscode_id": null,
        "phone_number": "081234567890",
        "is_main": 1,
        "biteship_id": area,
    })
}

fn order(id: i64, status: &str, shipping_status: Option<&str>) -> Value {
    json!({
        "order_id": id,
        "user_id": 7,
        "address_id": 3,
        "total_amount": "20000.00",
        "status": status,
        "shipping_status": shipping_status,
        "snap_token": "snap-fixture",
        "created_at": "2026-10-01 10:00:00",
        "items": [{
            "order_item_id": 1,
            "order_id": id,
            "product_id": 10,
            "quantity": 2,
            "price": "10000.00",
            "subtotal": "20000.00",
            "product": { "product_id": 10, "product_name": "Betta Halfmoon", "price": "10000.00" },
        }],
        "address": address(Some(DESTINATION_AREA)),
    })
}

fn order_by_id(id: i64) -> Option<Value> {
    let order = match id {
        CHECKOUT_ORDER => order(id, "pending", None),
        ORDER_WITHOUT_SNAP_TOKEN => {
            let mut order = order(id, "pending", None);
            order["snap_token"] = Value::Null;
            order
        }
        ORDER_WITHOUT_AREA => {
            let mut order = order(id, "pending", None);
            order["address"] = address(None);
            order
        }
        PAID_PROCESSING_ORDER => order(id, "success", Some("processing")),
        PENDING_ORDER => order(id, "pending", None),
        PAID_SHIPPED_ORDER => order(id, "success", Some("shipped")),
        _ => return None,
    };
    Some(order)
}

fn seller_orders(query: &str) -> Value {
    let page: u32 = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    json!({
        "orders": [
            order(PAID_PROCESSING_ORDER, "success", Some("processing")),
            order(PENDING_ORDER, "pending", None),
            order(PAID_SHIPPED_ORDER, "success", Some("shipped")),
        ],
        "pagination": { "current_page": page, "last_page": 3, "per_page": 3, "total": 9 },
    })
}
