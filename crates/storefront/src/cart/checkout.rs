//! One-way hand-off of the cart to the checkout page.
//!
//! On checkout the cart snapshot and its total are written to session-scoped
//! storage under two fixed keys. Nothing marks the data as consumed and
//! nothing expires it; a later checkout simply overwrites it.

use rust_decimal::Decimal;
use serenya_core::Cart;

use crate::storage::{Storage, StorageError};

/// Session key holding the cart snapshot (same schema as the durable slot).
pub const CHECKOUT_CART_KEY: &str = "checkout_cart";

/// Session key holding the stringified total.
pub const CHECKOUT_TOTAL_KEY: &str = "checkout_total";

/// Cart contents and total as handed to the checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    pub cart: Cart,
    pub total: Decimal,
}

impl CheckoutHandoff {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            cart: cart.clone(),
            total: cart.total(),
        }
    }

    /// Write both keys. The snapshot is written first.
    ///
    /// # Errors
    ///
    /// Returns the storage error of the first write that fails.
    pub async fn write(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(&self.cart)
            .map_err(|e| StorageError::Unavailable(format!("cannot serialize cart: {e}")))?;
        storage.set_item(CHECKOUT_CART_KEY, snapshot).await?;
        storage
            .set_item(CHECKOUT_TOTAL_KEY, self.total.normalize().to_string())
            .await
    }

    /// Read a previously written hand-off.
    ///
    /// Returns `None` when either key is missing, unreadable or malformed.
    pub async fn read(storage: &dyn Storage) -> Option<Self> {
        let snapshot = match storage.get_item(CHECKOUT_CART_KEY).await {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read checkout hand-off");
                return None;
            }
        };
        let total = storage.get_item(CHECKOUT_TOTAL_KEY).await.ok().flatten()?;

        let cart = serde_json::from_str::<Cart>(&snapshot)
            .inspect_err(|e| tracing::warn!(error = %e, "Discarding malformed checkout cart"))
            .ok()?;
        let total = total
            .parse::<Decimal>()
            .inspect_err(|e| tracing::warn!(error = %e, "Discarding malformed checkout total"))
            .ok()?;

        Some(Self { cart, total })
    }
}
