//! Order endpoints.

use bettabeal_core::{AddressId, OrderId, OrderStatus, ShippingStatus};
use tracing::instrument;

use super::{
    ApiError, BackendClient, CreateOrderRequest, CreatedOrder, Order, OrderList,
    UpdateOrderStatusRequest, UpdateShippingStatusRequest,
};
use crate::session::AuthSession;

impl BackendClient {
    /// Create an order from the cart, shipped to `address_id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn create_order(
        &self,
        session: &AuthSession,
        address_id: AddressId,
    ) -> Result<OrderId, ApiError> {
        let request = Self::authorized(self.http().post(self.url("orders")), session)
            .json(&CreateOrderRequest { address_id });
        let created = self
            .send::<CreatedOrder>(request)
            .await?
            .into_data("order_id")?;
        Ok(created.order_id)
    }

    /// Fetch one order, including its current snap token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn get_order(
        &self,
        session: &AuthSession,
        order_id: OrderId,
    ) -> Result<Order, ApiError> {
        let url = self.url(&format!("orders/{order_id}"));
        let request = Self::authorized(self.http().get(url), session);
        self.send::<Order>(request).await?.into_data("order")
    }

    /// Overwrite an order's payment-side status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn update_order_status(
        &self,
        session: &AuthSession,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("orders/{order_id}"));
        let request = Self::authorized(self.http().put(url), session)
            .json(&UpdateOrderStatusRequest { status });
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// List the customer's orders (all of them; pagination is local).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_orders(&self, session: &AuthSession) -> Result<Vec<Order>, ApiError> {
        let request = Self::authorized(self.http().get(self.url("orders")), session);
        let list = self.send::<OrderList>(request).await?.into_data("orders")?;
        Ok(list.orders)
    }

    /// List the seller's orders, one server-side page at a time.
    ///
    /// `status == None` lists every status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_seller_orders(
        &self,
        session: &AuthSession,
        page: u32,
        status: Option<&str>,
    ) -> Result<OrderList, ApiError> {
        let mut query = vec![("page", page.to_string())];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        let request =
            Self::authorized(self.http().get(self.url("orders")), session).query(&query);
        self.send::<OrderList>(request).await?.into_data("orders")
    }

    /// Set an order's fulfilment status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn update_shipping_status(
        &self,
        session: &AuthSession,
        order_id: OrderId,
        shipping_status: ShippingStatus,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("orders/{order_id}/shipping-status"));
        let request = Self::authorized(self.http().put(url), session)
            .json(&UpdateShippingStatusRequest { shipping_status });
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}
