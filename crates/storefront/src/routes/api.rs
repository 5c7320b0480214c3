//! JSON API for scripts that prefer data over fragments.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use serenya_core::{LineItem, NewLineItem};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::open_store;
use crate::cart::PersistStatus;
use crate::cart::view::money;
use crate::error::Result;
use crate::state::AppState;

/// Cart as returned by the API.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Rows in the stored format.
    pub items: Vec<LineItem>,
    pub count: u64,
    pub total: Decimal,
    /// Total with currency label.
    pub total_display: String,
    /// Whether the last write reached storage. Absent on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

/// Get the cart as JSON.
#[instrument(skip(state, session))]
pub async fn get_cart(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartResponse>> {
    let (store, _) = open_store(&state, &session).await?;
    Ok(Json(CartResponse {
        items: store.cart().items().to_vec(),
        count: store.count(),
        total: store.total(),
        total_display: money(store.total(), &store.settings().currency),
        saved: None,
    }))
}

/// Add a product from a JSON body.
#[instrument(skip(state, session, item), fields(item_id = %item.id))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(item): Json<NewLineItem>,
) -> Result<Json<CartResponse>> {
    let (mut store, _) = open_store(&state, &session).await?;
    let update = store.add_product(item).await;

    Ok(Json(CartResponse {
        items: store.cart().items().to_vec(),
        count: store.count(),
        total: store.total(),
        total_display: update.view.total,
        saved: Some(update.persisted == PersistStatus::Saved),
    }))
}
