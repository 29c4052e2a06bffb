//! Product and category endpoints.
//!
//! The listing, category and public detail endpoints need no session.

use bettabeal_core::ProductId;
use tracing::instrument;

use super::{ApiError, BackendClient, CatalogCategory, Product, ProductPage, ProductSummary};
use crate::session::AuthSession;

impl BackendClient {
    /// Fetch full product detail.
    ///
    /// Not cached: every view refetches.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn get_product(
        &self,
        session: &AuthSession,
        product_id: ProductId,
    ) -> Result<Product, ApiError> {
        let url = self.url(&format!("products/{product_id}"));
        let request = Self::authorized(self.http().get(url), session);
        self.send::<Product>(request).await?.into_data("product")
    }

    /// Fetch product detail, reviews included, without a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self))]
    pub async fn get_public_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let url = self.url(&format!("products/{product_id}"));
        self.send::<Product>(self.http().get(url))
            .await?
            .into_data("product")
    }

    /// First page of the public product listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self))]
    pub async fn list_products(&self, per_page: u32) -> Result<Vec<ProductSummary>, ApiError> {
        let request = self
            .http()
            .get(self.url("products"))
            .query(&[("per_page", per_page)]);
        let page = self.send::<ProductPage>(request).await?.into_data("products")?;
        Ok(page.data)
    }

    /// Every category, active or not.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CatalogCategory>, ApiError> {
        let request = self.http().get(self.url("categories"));
        self.send::<Vec<CatalogCategory>>(request)
            .await?
            .into_data("categories")
    }
}
