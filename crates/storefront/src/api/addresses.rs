//! Address and district endpoints.

use bettabeal_core::{AddressId, DistrictId};
use tracing::instrument;

use super::{Address, AddressInput, ApiError, BackendClient, District, Postcode};
use crate::session::AuthSession;

impl BackendClient {
    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_addresses(&self, session: &AuthSession) -> Result<Vec<Address>, ApiError> {
        let request = Self::authorized(self.http().get(self.url("addresses")), session);
        self.send::<Vec<Address>>(request)
            .await?
            .into_data("addresses")
    }

    /// Fetch one address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn get_address(
        &self,
        session: &AuthSession,
        address_id: AddressId,
    ) -> Result<Address, ApiError> {
        let url = self.url(&format!("addresses/{address_id}"));
        let request = Self::authorized(self.http().get(url), session);
        self.send::<Address>(request).await?.into_data("address")
    }

    /// Create an address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session, input))]
    pub async fn create_address(
        &self,
        session: &AuthSession,
        input: &AddressInput,
    ) -> Result<(), ApiError> {
        let request =
            Self::authorized(self.http().post(self.url("addresses")), session).json(input);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session, input))]
    pub async fn update_address(
        &self,
        session: &AuthSession,
        address_id: AddressId,
        input: &AddressInput,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("addresses/{address_id}"));
        let request = Self::authorized(self.http().put(url), session).json(input);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// Delete an address. There is no undo.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn delete_address(
        &self,
        session: &AuthSession,
        address_id: AddressId,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("addresses/{address_id}"));
        let request = Self::authorized(self.http().delete(url), session);
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    /// List districts for the address form.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_districts(&self, session: &AuthSession) -> Result<Vec<District>, ApiError> {
        let request = Self::authorized(self.http().get(self.url("districts")), session);
        self.send::<Vec<District>>(request)
            .await?
            .into_data("districts")
    }

    /// List postcodes within a district.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, non-2xx, or business failure.
    #[instrument(skip(self, session))]
    pub async fn list_postcodes(
        &self,
        session: &AuthSession,
        district_id: DistrictId,
    ) -> Result<Vec<Postcode>, ApiError> {
        let url = self.url(&format!("districts/{district_id}/poscodes"));
        let request = Self::authorized(self.http().get(url), session);
        self.send::<Vec<Postcode>>(request)
            .await?
            .into_data("postcodes")
    }
}
