//! Public catalog: active categories, best sellers and product detail.
//!
//! Nothing here needs a session. The landing lists degrade to empty when
//! the backend fails; a product page either loads or is not found.

use bettabeal_core::ProductId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::api::{ApiError, BackendClient, CatalogCategory, Product, ProductSummary};

/// Products requested from the listing when picking best sellers.
pub const LISTING_PAGE_SIZE: u32 = 12;

/// Best sellers shown on the catalog landing.
pub const BEST_SELLER_COUNT: usize = 5;

/// A product counts as new for this many days after creation.
pub const NEW_PRODUCT_DAYS: u64 = 7;

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// A best-selling product and whether to badge it as new.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSeller {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub is_new: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogOverview {
    pub categories: Vec<CatalogCategory>,
    pub best_sellers: Vec<BestSeller>,
}

/// Keep only the categories the shop has switched on.
#[must_use]
pub fn active_categories(categories: Vec<CatalogCategory>) -> Vec<CatalogCategory> {
    categories.into_iter().filter(|c| c.is_active).collect()
}

/// Whether a product created at `created_at` is at most a week old.
///
/// Partial days round up, so anything within the last 7 * 24 hours is new.
/// A product without a creation time is never new.
#[must_use]
pub fn is_new(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    created_at.is_some_and(|created_at| {
        let elapsed = (now - created_at).num_milliseconds().unsigned_abs();
        elapsed.div_ceil(MILLIS_PER_DAY) <= NEW_PRODUCT_DAYS
    })
}

/// The top active products by sales, highest first.
///
/// Ties keep the listing's order.
#[must_use]
pub fn best_sellers(products: Vec<ProductSummary>, now: DateTime<Utc>) -> Vec<BestSeller> {
    let mut active: Vec<ProductSummary> = products.into_iter().filter(|p| p.is_active).collect();
    active.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    active
        .into_iter()
        .take(BEST_SELLER_COUNT)
        .map(|product| BestSeller {
            is_new: is_new(product.created_at, now),
            product,
        })
        .collect()
}

/// Read-only catalog over the public backend endpoints.
#[derive(Clone)]
pub struct CatalogService {
    backend: BackendClient,
}

impl CatalogService {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Active categories and best sellers, each empty if its call fails.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> CatalogOverview {
        let (categories, products) = tokio::join!(
            self.backend.list_categories(),
            self.backend.list_products(LISTING_PAGE_SIZE),
        );

        let categories = categories.map_or_else(
            |e| {
                tracing::error!(error = %e, "Error fetching categories");
                Vec::new()
            },
            active_categories,
        );
        let best_sellers = products.map_or_else(
            |e| {
                tracing::error!(error = %e, "Error fetching products");
                Vec::new()
            },
            |products| best_sellers(products, Utc::now()),
        );

        CatalogOverview {
            categories,
            best_sellers,
        }
    }

    /// One product with its reviews.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; callers treat any failure as not found.
    #[instrument(skip(self))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        self.backend.get_public_product(product_id).await
    }
}
