//! Address route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bettabeal_core::{AddressId, DistrictId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::addresses::{AddressForm, default_selection};
use crate::api::{Address, District, Postcode};
use crate::biteship::Area;
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::state::AppState;
use crate::toast::Toast;

/// Saved addresses, with the one to pre-select at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct AddressListView {
    pub addresses: Vec<Address>,
    pub selected: Option<AddressId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toasts: Vec<Toast>,
}

impl AddressListView {
    fn new(addresses: Vec<Address>) -> Self {
        Self {
            selected: default_selection(&addresses),
            addresses,
            toasts: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    #[serde(default)]
    pub input: String,
}

/// List saved addresses.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
) -> Result<Json<AddressListView>> {
    let addresses = state.addresses().list(&auth).await?;
    Ok(Json(AddressListView::new(addresses)))
}

/// Show one address.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(address_id): Path<AddressId>,
) -> Result<Json<Address>> {
    Ok(Json(state.addresses().get(&auth, address_id).await?))
}

/// Create an address.
#[instrument(skip(state, auth, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Json(form): Json<AddressForm>,
) -> Result<(StatusCode, Json<AddressListView>)> {
    state.addresses().create(&auth, form).await?;
    let mut view = AddressListView::new(state.addresses().list(&auth).await?);
    view.toasts.push(Toast::success("Address saved"));
    Ok((StatusCode::CREATED, Json(view)))
}

/// Replace an address.
#[instrument(skip(state, auth, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(address_id): Path<AddressId>,
    Json(form): Json<AddressForm>,
) -> Result<Json<AddressListView>> {
    state.addresses().update(&auth, address_id, form).await?;
    let mut view = AddressListView::new(state.addresses().list(&auth).await?);
    view.toasts.push(Toast::success("Address updated"));
    Ok(Json(view))
}

/// Delete an address. The client confirms before calling this.
#[instrument(skip(state, auth))]
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(address_id): Path<AddressId>,
) -> Result<Json<AddressListView>> {
    state.addresses().delete(&auth, address_id).await?;
    let mut view = AddressListView::new(state.addresses().list(&auth).await?);
    view.toasts.push(Toast::success("Address deleted"));
    Ok(Json(view))
}

/// Autocomplete shipping areas.
#[instrument(skip(state, _auth))]
pub async fn areas(
    State(state): State<AppState>,
    RequireSession(_auth): RequireSession,
    Query(query): Query<AreaQuery>,
) -> Json<Vec<Area>> {
    Json(state.addresses().search(&query.input).await)
}

/// List districts.
pub async fn districts(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
) -> Result<Json<Vec<District>>> {
    Ok(Json(state.addresses().districts(&auth).await?))
}

/// List postcodes in a district.
pub async fn postcodes(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(district_id): Path<DistrictId>,
) -> Result<Json<Vec<Postcode>>> {
    Ok(Json(state.addresses().postcodes(&auth, district_id).await?))
}
