//! Biteship wire types.

use bettabeal_core::Rupiah;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/rates/couriers`.
#[derive(Debug, Clone, Serialize)]
pub struct RateRequest<'a> {
    pub origin_area_id: &'a str,
    pub destination_area_id: &'a str,
    pub couriers: &'a str,
    pub items: &'a [RateItem],
}

/// One parcel line in a rate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateItem {
    pub name: String,
    pub description: String,
    /// Whole rupiah; the API rejects fractional amounts.
    pub value: i64,
    /// Grams.
    pub weight: u32,
    pub quantity: u32,
}

/// Response of `POST /v1/rates/couriers`.
#[derive(Debug, Clone, Deserialize)]
pub struct RateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pricing: Vec<CourierRate>,
}

/// A priced courier service, as returned upstream (no id of its own).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourierRate {
    pub courier_name: String,
    pub courier_service_name: String,
    pub courier_service_code: String,
    #[serde(default)]
    pub duration: String,
    pub price: Rupiah,
}

/// Response of `GET /v1/maps/areas`.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub areas: Vec<Area>,
}

/// A shipping destination in Biteship's area directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_response_parses_pricing() {
        let response: RateResponse = serde_json::from_str(
            r#"{"success":true,"object":"courier_pricing","pricing":[
                {"courier_name":"JNE","courier_service_name":"Reguler",
                 "courier_service_code":"reg","duration":"1 - 2 days","price":9000,
                 "company":"jne","type":"reg"}]}"#,
        )
        .unwrap();
        assert!(response.success);
        assert_eq!(response.pricing[0].price, Rupiah::from_whole(9000));
    }

    #[test]
    fn test_failed_rate_response_keeps_message() {
        let response: RateResponse =
            serde_json::from_str(r#"{"success":false,"error":"x","message":"No courier available"}"#)
                .unwrap();
        assert!(!response.success);
        assert!(response.pricing.is_empty());
        assert_eq!(response.message.as_deref(), Some("No courier available"));
    }
}
