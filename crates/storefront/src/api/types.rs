//! Wire types for the BettaBeal REST backend.
//!
//! Field names follow the backend's snake_case JSON. Where the backend is
//! loose about representation (`is_main` as `0/1`, money as strings or
//! numbers, several timestamp layouts) the deserializers here accept every
//! observed form.

use std::collections::BTreeMap;

use bettabeal_core::{
    AddressId, CartItemId, CategoryId, DistrictId, OrderId, OrderItemId, OrderStatus, PhoneNumber,
    PostcodeId, ProductId, Rupiah, ShippingStatus, UserId, UserRole, WishlistId,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Cart
// =============================================================================

/// The visitor's cart as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartData {
    pub total_items: u32,
    pub subtotal: Rupiah,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// One cart line.
///
/// `total_price == quantity * product.price` is expected but only the
/// optimistic patches maintain it locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_item_id: CartItemId,
    pub product: CartProduct,
    pub quantity: u32,
    pub total_price: Rupiah,
}

/// Product summary embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: ProductId,
    pub name: String,
    pub price: Rupiah,
}

/// Body of `POST /api/cart/add`.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /api/cart/update`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItemRequest {
    pub cart_item_id: CartItemId,
    pub quantity: u32,
}

// =============================================================================
// Products
// =============================================================================

/// Full product detail from `GET /api/products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    #[serde(alias = "name")]
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    pub price: Rupiah,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub main_image: Option<ProductImage>,
    #[serde(default)]
    pub additional_images: Vec<ProductImage>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_breakdown: BTreeMap<String, u32>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A category from `GET /api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub category_id: CategoryId,
    pub category_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub is_active: bool,
}

/// One row of the public product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Rupiah,
    #[serde(default)]
    pub main_image: Option<ProductImage>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_sales: u64,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload of `GET /api/products`: one server-side page.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Vec<ProductSummary>,
}

// =============================================================================
// Wishlist
// =============================================================================

/// A saved product. The embedded product is a summary until refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub wishlist_id: WishlistId,
    pub product: Product,
}

// =============================================================================
// Orders
// =============================================================================

/// An order as returned by `GET /api/orders/{id}` and the listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub address_id: Option<AddressId>,
    pub total_amount: Rupiah,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_status: Option<ShippingStatus>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub snap_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, alias = "shipping_address")]
    pub address: Option<Address>,
    #[serde(default, alias = "customer")]
    pub user: Option<OrderCustomer>,
}

impl Order {
    /// Shipping status label for listings (`N/A` before fulfilment starts).
    #[must_use]
    pub fn shipping_label(&self) -> &'static str {
        self.shipping_status.map_or("N/A", ShippingStatus::label)
    }

    /// Courier-API destination of the order, if its address was geocoded.
    #[must_use]
    pub fn destination_area_id(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|address| address.biteship_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: OrderItemId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Rupiah,
    pub subtotal: Rupiah,
    pub product: OrderProduct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    pub price: Rupiah,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub address_id: AddressId,
}

/// Payload of a successful `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrder {
    pub order_id: OrderId,
}

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Body of `PUT /api/orders/{id}/shipping-status`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateShippingStatusRequest {
    pub shipping_status: ShippingStatus,
}

/// Order listing payload. Seller listings are paginated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved shipping address.
///
/// `biteship_id` is the courier API's area id; an address without one cannot
/// be quoted for shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: AddressId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub district_id: Option<DistrictId>,
    #[serde(default, rename = "poscode_id")]
    pub postcode_id: Option<PostcodeId>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub is_main: bool,
    #[serde(default)]
    pub biteship_id: Option<String>,
}

/// Body of `POST /api/addresses` and `PUT /api/addresses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInput {
    pub name: String,
    pub address: String,
    pub district_id: DistrictId,
    #[serde(rename = "poscode_id")]
    pub postcode_id: Option<PostcodeId>,
    pub phone_number: PhoneNumber,
    pub is_main: bool,
    pub biteship_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub district_id: DistrictId,
    pub district_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postcode {
    #[serde(rename = "poscode_id")]
    pub postcode_id: PostcodeId,
    pub code: String,
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /api/login`. Not wrapped in the usual envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/register/customer`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub full_name: &'a str,
    pub username: &'a str,
    pub birth_date: NaiveDate,
    pub phone_number: &'a PhoneNumber,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub user_id: UserId,
    pub role: UserRole,
}

// =============================================================================
// Deserialization helpers
// =============================================================================

/// Accept `true`/`false`, `0`/`1`, or `"0"`/`"1"`.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Str(s)) => matches!(s.as_str(), "1" | "true"),
        None => false,
    })
}

/// Accept RFC 3339 timestamps or `YYYY-MM-DD HH:MM:SS` (assumed UTC).
///
/// Unparseable values become `None` instead of failing the whole payload.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(&raw))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
