//! Shipping-rate resolution.
//!
//! Turns an order's lines into a Biteship rate request and normalizes the
//! priced services into [`CourierOption`]s the checkout page can select
//! from. Options are recomputed on every query and never persisted beyond
//! the checkout session.

use bettabeal_core::Rupiah;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::OrderItem;
use crate::biteship::{BiteshipClient, BiteshipError, CourierRate, RateItem};

/// Parcel weight sent for every order line, in grams.
///
/// Product weights are not tracked by the backend.
pub const DEFAULT_ITEM_WEIGHT_GRAMS: u32 = 500;

/// A selectable courier service.
///
/// `id` is synthesized as `{courier_name}-{courier_service_code}-{index}`;
/// the index suffix keeps it unique within one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierOption {
    pub id: String,
    pub courier_name: String,
    pub courier_service_name: String,
    pub courier_service_code: String,
    pub duration: String,
    pub price: Rupiah,
}

impl CourierOption {
    /// Delivery estimate for display.
    #[must_use]
    pub fn duration_label(&self) -> String {
        format_duration(&self.duration)
    }
}

/// Resolves courier options for a destination.
#[derive(Clone)]
pub struct ShippingRateResolver {
    client: BiteshipClient,
}

impl ShippingRateResolver {
    #[must_use]
    pub const fn new(client: BiteshipClient) -> Self {
        Self { client }
    }

    /// Quote couriers for shipping `items` to `destination_area_id`.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged; its `Display` is the message
    /// shown to the user.
    #[instrument(skip(self, items))]
    pub async fn resolve_rates(
        &self,
        destination_area_id: &str,
        items: &[OrderItem],
    ) -> Result<Vec<CourierOption>, BiteshipError> {
        let rate_items = rate_items(items);
        let rates = self.client.rates(destination_area_id, &rate_items).await?;
        Ok(options_from_rates(rates))
    }
}

/// Build the rate-request parcel lines for an order.
#[must_use]
pub fn rate_items(items: &[OrderItem]) -> Vec<RateItem> {
    items
        .iter()
        .map(|item| RateItem {
            name: item.product.product_name.clone(),
            description: item.product.description.clone(),
            value: item.product.price.to_whole(),
            weight: DEFAULT_ITEM_WEIGHT_GRAMS,
            quantity: item.quantity,
        })
        .collect()
}

/// Attach synthesized ids to upstream rates, preserving order.
#[must_use]
pub fn options_from_rates(rates: Vec<CourierRate>) -> Vec<CourierOption> {
    rates
        .into_iter()
        .enumerate()
        .map(|(index, rate)| CourierOption {
            id: format!(
                "{}-{}-{index}",
                rate.courier_name, rate.courier_service_code
            ),
            courier_name: rate.courier_name,
            courier_service_name: rate.courier_service_name,
            courier_service_code: rate.courier_service_code,
            duration: rate.duration,
            price: rate.price,
        })
        .collect()
}

/// Humanize the few duration strings Biteship returns in raw form.
#[must_use]
pub fn format_duration(duration: &str) -> String {
    match duration {
        "1 - 1" | "1" => "1 day".to_string(),
        "0 days" => "same day".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bettabeal_core::{OrderItemId, ProductId};

    use super::*;
    use crate::api::OrderProduct;

    fn rate(name: &str, code: &str, price: i64) -> CourierRate {
        CourierRate {
            courier_name: name.to_string(),
            courier_service_name: "Reguler".to_string(),
            courier_service_code: code.to_string(),
            duration: "1 - 2 days".to_string(),
            price: Rupiah::from_whole(price),
        }
    }

    #[test]
    fn test_option_ids_unique_even_when_upstream_collides() {
        let options = options_from_rates(vec![
            rate("JNE", "REG", 9000),
            rate("JNE", "REG", 9000),
            rate("TIKI", "ECO", 8000),
        ]);
        let ids: Vec<_> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["JNE-REG-0", "JNE-REG-1", "TIKI-ECO-2"]);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    }

    #[test]
    fn test_rate_items_use_fixed_weight() {
        let items = vec![OrderItem {
            order_item_id: OrderItemId::new(1),
            order_id: None,
            product_id: ProductId::new(10),
            quantity: 2,
            price: Rupiah::from_whole(10_000),
            subtotal: Rupiah::from_whole(20_000),
            product: OrderProduct {
                product_id: ProductId::new(10),
                product_name: "Cupang Halfmoon".to_string(),
                description: "Betta jantan".to_string(),
                price: Rupiah::from_whole(10_000),
            },
        }];
        let rate_items = rate_items(&items);
        assert_eq!(rate_items.len(), 1);
        assert_eq!(rate_items[0].weight, 500);
        assert_eq!(rate_items[0].value, 10_000);
        assert_eq!(rate_items[0].quantity, 2);
        assert_eq!(rate_items[0].name, "Cupang Halfmoon");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("1 - 1"), "1 day");
        assert_eq!(format_duration("1"), "1 day");
        assert_eq!(format_duration("0 days"), "same day");
        assert_eq!(format_duration("2 - 3 days"), "2 - 3 days");
    }
}
