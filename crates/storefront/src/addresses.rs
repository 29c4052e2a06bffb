//! Address directory: saved shipping addresses plus the area lookup that
//! geocodes them for courier quotes.

use bettabeal_core::{AddressId, DistrictId, PhoneNumber, PhoneNumberError, PostcodeId};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::api::{Address, AddressInput, ApiError, BackendClient, District, Postcode};
use crate::biteship::{Area, BiteshipClient};
use crate::session::AuthSession;

/// Why an address form was refused before reaching the backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressFormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid phone number: {0}")]
    Phone(#[from] PhoneNumberError),
}

#[derive(Debug, Error)]
pub enum AddressError {
    #[error(transparent)]
    Invalid(#[from] AddressFormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Address form as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district_id: Option<DistrictId>,
    #[serde(default, alias = "poscode_id")]
    pub postcode_id: Option<PostcodeId>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub biteship_id: Option<String>,
}

impl AddressForm {
    /// Check required fields and normalize the form into a request body.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or an invalid phone number.
    pub fn validate(self) -> Result<AddressInput, AddressFormError> {
        let name = required(self.name, "name")?;
        let address = required(self.address, "address")?;
        let district_id = self
            .district_id
            .ok_or(AddressFormError::MissingField("district_id"))?;
        let phone_number = PhoneNumber::parse(&self.phone_number)?;

        Ok(AddressInput {
            name,
            address,
            district_id,
            postcode_id: self.postcode_id,
            phone_number,
            is_main: self.is_main,
            biteship_id: self
                .biteship_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String, AddressFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AddressFormError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// The address to pre-select at checkout: the main address, if any.
#[must_use]
pub fn default_selection(addresses: &[Address]) -> Option<AddressId> {
    addresses
        .iter()
        .find(|address| address.is_main)
        .map(|address| address.address_id)
}

/// CRUD over saved addresses and the area autocomplete.
#[derive(Clone)]
pub struct AddressDirectory {
    backend: BackendClient,
    biteship: BiteshipClient,
}

impl AddressDirectory {
    #[must_use]
    pub const fn new(backend: BackendClient, biteship: BiteshipClient) -> Self {
        Self { backend, biteship }
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the listing fails.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<Address>, ApiError> {
        self.backend.list_addresses(session).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the address cannot be loaded.
    pub async fn get(
        &self,
        session: &AuthSession,
        address_id: AddressId,
    ) -> Result<Address, ApiError> {
        self.backend.get_address(session, address_id).await
    }

    /// Validate and save a new address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Invalid` without calling the backend when the
    /// form is incomplete.
    #[instrument(skip(self, session, form))]
    pub async fn create(&self, session: &AuthSession, form: AddressForm) -> Result<(), AddressError> {
        let input = form.validate()?;
        self.backend.create_address(session, &input).await?;
        Ok(())
    }

    /// Validate and replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Invalid` without calling the backend when the
    /// form is incomplete.
    #[instrument(skip(self, session, form))]
    pub async fn update(
        &self,
        session: &AuthSession,
        address_id: AddressId,
        form: AddressForm,
    ) -> Result<(), AddressError> {
        let input = form.validate()?;
        self.backend
            .update_address(session, address_id, &input)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the deletion fails.
    pub async fn delete(&self, session: &AuthSession, address_id: AddressId) -> Result<(), ApiError> {
        self.backend.delete_address(session, address_id).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the listing fails.
    pub async fn districts(&self, session: &AuthSession) -> Result<Vec<District>, ApiError> {
        self.backend.list_districts(session).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the listing fails.
    pub async fn postcodes(
        &self,
        session: &AuthSession,
        district_id: DistrictId,
    ) -> Result<Vec<Postcode>, ApiError> {
        self.backend.list_postcodes(session, district_id).await
    }

    /// Autocomplete shipping areas. Failures yield no suggestions.
    ///
    /// Callers are expected to debounce; nothing is throttled here.
    pub async fn search(&self, input: &str) -> Vec<Area> {
        match self.biteship.search_areas(input).await {
            Ok(areas) => areas,
            Err(e) => {
                tracing::warn!(error = %e, "Area search failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> AddressForm {
        AddressForm {
            name: " Budi ".to_string(),
            address: "Jl. Mawar 1".to_string(),
            district_id: Some(DistrictId::new(3)),
            postcode_id: Some(PostcodeId::new(7)),
            phone_number: "081234567890".to_string(),
            is_main: true,
            biteship_id: Some("IDNP6IDNC148".to_string()),
        }
    }

    #[test]
    fn test_validate_trims_and_keeps_fields() {
        let input = form().validate().unwrap();
        assert_eq!(input.name, "Budi");
        assert_eq!(input.postcode_id, Some(PostcodeId::new(7)));
        assert!(input.is_main);
        assert_eq!(input.biteship_id.as_deref(), Some("IDNP6IDNC148"));
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut missing_name = form();
        missing_name.name = "  ".to_string();
        assert_eq!(
            missing_name.validate(),
            Err(AddressFormError::MissingField("name"))
        );

        let mut missing_district = form();
        missing_district.district_id = None;
        assert_eq!(
            missing_district.validate(),
            Err(AddressFormError::MissingField("district_id"))
        );

        let mut bad_phone = form();
        bad_phone.phone_number = "+62 812".to_string();
        assert_eq!(
            bad_phone.validate(),
            Err(AddressFormError::Phone(PhoneNumberError::NonDigit))
        );
    }

    #[test]
    fn test_validate_drops_blank_area() {
        let mut blank_area = form();
        blank_area.biteship_id = Some(" ".to_string());
        assert_eq!(blank_area.validate().unwrap().biteship_id, None);
    }

    #[test]
    fn test_form_accepts_backend_postcode_name() {
        let form: AddressForm = serde_json::from_str(
            r#"{"name":"A","address":"B","district_id":1,"poscode_id":2,"phone_number":"0812"}"#,
        )
        .unwrap();
        assert_eq!(form.postcode_id, Some(PostcodeId::new(2)));
    }

    #[test]
    fn test_default_selection_prefers_main() {
        let addresses: Vec<Address> = serde_json::from_str(
            r#"[{"address_id":1,"name":"A","address":"x","is_main":0},
                {"address_id":2,"name":"B","address":"y","is_main":1}]"#,
        )
        .unwrap();
        assert_eq!(default_selection(&addresses), Some(AddressId::new(2)));
        assert_eq!(default_selection(&addresses[..1]), None);
    }
}
