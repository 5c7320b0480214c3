//! The cart store: authoritative line-item list, its persistence and its view.
//!
//! Every mutation follows the same path: change the in-memory [`Cart`], write
//! the snapshot to the durable slot, rebuild the [`CartView`] from scratch and
//! publish it. Storage problems never escape: a bad snapshot loads as an empty
//! cart and a failed write is logged while the in-memory cart stays
//! authoritative. The outcome of each step is returned as a status value so
//! callers can decide whether to care.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serenya_core::{Cart, ItemId, NewLineItem};
use tokio::sync::watch;

use super::checkout::CheckoutHandoff;
use super::view::CartView;
use crate::storage::Storage;
use crate::widgets::CartPanel;

/// Default key of the durable cart slot.
pub const DEFAULT_STORAGE_KEY: &str = "serenya_cart";

/// Default checkout destination.
pub const DEFAULT_CHECKOUT_PATH: &str = "/checkout";

/// Default delay before the panel opens after an add.
pub const DEFAULT_AUTO_OPEN_DELAY: Duration = Duration::from_millis(500);

/// Default currency label in rendered amounts.
pub const DEFAULT_CURRENCY: &str = "Rs.";

/// Knobs of a [`CartStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Key of the durable slot holding the snapshot.
    pub storage_key: String,
    /// Where checkout navigates to.
    pub checkout_path: String,
    pub auto_open_delay: Duration,
    pub currency: String,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            checkout_path: DEFAULT_CHECKOUT_PATH.to_string(),
            auto_open_delay: DEFAULT_AUTO_OPEN_DELAY,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Result of [`CartStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved cart with this many rows was restored.
    Restored { rows: usize },
    /// Nothing was saved yet.
    Empty,
    /// The slot could not be read or held malformed data; the cart starts empty.
    Discarded,
}

/// Result of writing the durable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStatus {
    Saved,
    /// The write failed; the in-memory cart is still authoritative.
    Failed,
}

/// What a mutation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    /// The freshly rebuilt view.
    pub view: CartView,
    pub persisted: PersistStatus,
}

/// Result of [`CartStore::checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart has no items; nothing was written and nobody navigates.
    Empty,
    /// The hand-off could not be written; nobody navigates.
    HandoffFailed,
    /// The hand-off was written; navigate to `location`.
    Proceed { location: String },
}

/// One page session's cart.
///
/// The durable slot keeps the cart between page loads; the session slot only
/// receives the checkout hand-off.
pub struct CartStore {
    cart: Cart,
    durable: Arc<dyn Storage>,
    session: Arc<dyn Storage>,
    settings: CartSettings,
    panel: Option<CartPanel>,
    views: watch::Sender<CartView>,
}

impl CartStore {
    /// Create a store holding an empty cart. Call [`CartStore::load`] to
    /// restore the saved one.
    #[must_use]
    pub fn new(
        durable: Arc<dyn Storage>,
        session: Arc<dyn Storage>,
        settings: CartSettings,
    ) -> Self {
        let (views, _) = watch::channel(CartView::empty(&settings.currency));
        Self {
            cart: Cart::new(),
            durable,
            session,
            settings,
            panel: None,
            views,
        }
    }

    /// Create a store and restore the saved cart.
    pub async fn restore(
        durable: Arc<dyn Storage>,
        session: Arc<dyn Storage>,
        settings: CartSettings,
    ) -> (Self, LoadOutcome) {
        let mut store = Self::new(durable, session, settings);
        let outcome = store.load().await;
        (store, outcome)
    }

    /// Attach the panel that opens after each add.
    #[must_use]
    pub fn with_panel(mut self, panel: CartPanel) -> Self {
        self.panel = Some(panel);
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &CartSettings {
        &self.settings
    }

    /// Replace the in-memory cart with the saved snapshot.
    pub async fn load(&mut self) -> LoadOutcome {
        let key = &self.settings.storage_key;
        let (cart, outcome) = match self.durable.get_item(key).await {
            Ok(None) => (Cart::new(), LoadOutcome::Empty),
            Ok(Some(snapshot)) => match serde_json::from_str::<Cart>(&snapshot) {
                Ok(cart) => {
                    let rows = cart.len();
                    (cart, LoadOutcome::Restored { rows })
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding malformed saved cart");
                    (Cart::new(), LoadOutcome::Discarded)
                }
            },
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not load cart from storage");
                (Cart::new(), LoadOutcome::Discarded)
            }
        };
        self.cart = cart;
        self.render();
        outcome
    }

    /// Write the current cart to the durable slot.
    pub async fn save(&self) -> PersistStatus {
        let key = &self.settings.storage_key;
        let snapshot = match serde_json::to_string(&self.cart) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Could not serialize cart");
                return PersistStatus::Failed;
            }
        };
        match self.durable.set_item(key, snapshot).await {
            Ok(()) => PersistStatus::Saved,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Could not save cart to storage");
                PersistStatus::Failed
            }
        }
    }

    /// Add a product, merging into the row with the same id.
    ///
    /// Schedules the attached panel to open after the configured delay.
    pub async fn add_product(&mut self, item: NewLineItem) -> CartUpdate {
        let id = item.id.clone();
        let outcome = self.cart.add(item);
        tracing::debug!(item = %id, ?outcome, "Added product to cart");

        let update = self.commit().await;
        if let Some(panel) = &self.panel {
            panel.schedule_open(self.settings.auto_open_delay);
        }
        update
    }

    /// Add one unit to the row for `id`. `None` if there is no such row.
    pub async fn increase_quantity(&mut self, id: &ItemId) -> Option<CartUpdate> {
        self.cart.increase(id)?;
        Some(self.commit().await)
    }

    /// Remove one unit from the row for `id`, dropping the row at zero.
    /// `None` if there is no such row.
    pub async fn decrease_quantity(&mut self, id: &ItemId) -> Option<CartUpdate> {
        let outcome = self.cart.decrease(id)?;
        tracing::debug!(item = %id, ?outcome, "Decreased quantity");
        Some(self.commit().await)
    }

    /// Remove the row for `id` outright. `None` if there is no such row.
    pub async fn remove_item(&mut self, id: &ItemId) -> Option<CartUpdate> {
        self.cart.remove(id)?;
        Some(self.commit().await)
    }

    pub async fn clear_cart(&mut self) -> CartUpdate {
        self.cart.clear();
        self.commit().await
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// The current view, built fresh from the cart.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::build(&self.cart, &self.settings.currency)
    }

    /// Receive every rebuilt view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.views.subscribe()
    }

    /// Hand the cart to the checkout page.
    ///
    /// Does nothing when the cart holds no items.
    pub async fn checkout(&self) -> CheckoutOutcome {
        if self.count() == 0 {
            tracing::debug!("Checkout skipped for empty cart");
            return CheckoutOutcome::Empty;
        }

        let handoff = CheckoutHandoff::from_cart(&self.cart);
        if let Err(e) = handoff.write(self.session.as_ref()).await {
            tracing::error!(error = %e, "Could not write checkout hand-off");
            return CheckoutOutcome::HandoffFailed;
        }

        tracing::info!(
            rows = self.cart.len(),
            total = %handoff.total,
            "Proceeding to checkout"
        );
        CheckoutOutcome::Proceed {
            location: self.settings.checkout_path.clone(),
        }
    }

    async fn commit(&mut self) -> CartUpdate {
        let persisted = self.save().await;
        let view = self.render();
        CartUpdate { view, persisted }
    }

    fn render(&self) -> CartView {
        let view = self.view();
        self.views.send_replace(view.clone());
        view
    }
}
