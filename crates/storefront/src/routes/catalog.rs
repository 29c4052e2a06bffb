//! Public catalog pages. No session required.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use bettabeal_core::{CategoryId, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::api::{CatalogCategory, Product, ProductImage, Review, Seller};
use crate::catalog::BestSeller;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category_id: CategoryId,
    pub category_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<CatalogCategory> for CategoryView {
    fn from(category: CatalogCategory) -> Self {
        Self {
            category_id: category.category_id,
            category_name: category.category_name,
            description: category.description,
            icon: category.icon,
        }
    }
}

/// A best-seller card.
#[derive(Debug, Clone, Serialize)]
pub struct BestSellerView {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: String,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    pub average_rating: Option<f64>,
    pub total_sales: u64,
    pub is_new: bool,
}

impl From<BestSeller> for BestSellerView {
    fn from(best: BestSeller) -> Self {
        let product = best.product;
        Self {
            product_id: product.product_id,
            price: product.price.display(),
            product_name: product.product_name,
            image_url: product.main_image.map(|image| image.image_url),
            category_name: product.category.map(|category| category.category_name),
            average_rating: product.average_rating,
            total_sales: product.total_sales,
            is_new: best.is_new,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub categories: Vec<CategoryView>,
    pub best_sellers: Vec<BestSellerView>,
}

/// Product page data, reviews included.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailView {
    pub product_id: ProductId,
    pub product_name: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: u32,
    pub main_image: Option<ProductImage>,
    pub additional_images: Vec<ProductImage>,
    pub category_name: Option<String>,
    pub seller: Option<Seller>,
    pub average_rating: Option<f64>,
    /// Star rating ("1".."5") to number of reviews.
    pub rating_breakdown: BTreeMap<String, u32>,
    pub review_count: usize,
    pub reviews: Vec<Review>,
}

impl From<Product> for ProductDetailView {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            price: product.price.display(),
            product_name: product.product_name,
            description: product.description,
            stock_quantity: product.stock_quantity,
            main_image: product.main_image,
            additional_images: product.additional_images,
            category_name: product.category.map(|category| category.category_name),
            seller: product.seller,
            average_rating: product.average_rating,
            rating_breakdown: product.rating_breakdown,
            review_count: product.reviews.len(),
            reviews: product.reviews,
        }
    }
}

/// Catalog landing: active categories and best sellers.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<CatalogView> {
    let overview = state.catalog().overview().await;
    Json(CatalogView {
        categories: overview.categories.into_iter().map(CategoryView::from).collect(),
        best_sellers: overview
            .best_sellers
            .into_iter()
            .map(BestSellerView::from)
            .collect(),
    })
}

/// One product with its reviews. Any backend failure is a 404.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductDetailView>> {
    match state.catalog().product(product_id).await {
        Ok(product) => Ok(Json(ProductDetailView::from(product))),
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "Error fetching product");
            Err(AppError::NotFound(format!("product {product_id}")))
        }
    }
}
