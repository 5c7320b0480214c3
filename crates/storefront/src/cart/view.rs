//! Derived display data for the cart panel.
//!
//! A [`CartView`] is rebuilt from the full [`Cart`] after every change and
//! never patched in place, so the indices and handles it exposes always match
//! the list they were built from.

use rust_decimal::Decimal;
use serde::Serialize;
use serenya_core::{Cart, ItemId, LineItem, format_amount};

/// Element ids the cart markup exposes to scripts and HTMX targets.
pub mod dom {
    pub const BADGE: &str = "cartBadge";
    pub const COUNT: &str = "cartCount";
    pub const TOTAL: &str = "cartTotalAmount";
    pub const CONTENT: &str = "cartContent";
    pub const EMPTY: &str = "cartEmpty";
    pub const FOOTER: &str = "cartFooter";
    pub const OVERLAY: &str = "cartOverlay";
    pub const ICON: &str = "cartIcon";
    pub const CLOSE: &str = "cartClose";
}

/// One rendered cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: ItemId,
    /// Form value identifying the row in increase/decrease/remove requests.
    pub handle: String,
    pub name: String,
    pub image: String,
    pub color: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Everything the cart panel and badge display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub count: u64,
    /// e.g. `"1 item in cart"`, `"3 items in cart"`.
    pub count_label: String,
    pub total: String,
    pub is_empty: bool,
}

impl CartView {
    /// Build the view for `cart`, prefixing amounts with `currency`.
    #[must_use]
    pub fn build(cart: &Cart, currency: &str) -> Self {
        let count = cart.count();
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::build(item, currency))
                .collect(),
            count,
            count_label: count_label(count),
            total: money(cart.total(), currency),
            is_empty: cart.is_empty(),
        }
    }

    /// View of an empty cart.
    #[must_use]
    pub fn empty(currency: &str) -> Self {
        Self::build(&Cart::new(), currency)
    }

    /// Whether the header badge is shown.
    #[must_use]
    pub const fn show_badge(&self) -> bool {
        self.count > 0
    }
}

impl CartItemView {
    fn build(item: &LineItem, currency: &str) -> Self {
        Self {
            id: item.id.clone(),
            handle: item.id.to_form_value(),
            name: item.name.clone(),
            image: item.image.clone(),
            color: item.color.clone(),
            quantity: item.quantity.get(),
            line_total: money(item.line_total(), currency),
        }
    }
}

fn count_label(count: u64) -> String {
    let noun = if count == 1 { "item" } else { "items" };
    format!("{count} {noun} in cart")
}

/// Format an amount with the currency label, e.g. `Rs. 1,500`.
#[must_use]
pub fn money(amount: Decimal, currency: &str) -> String {
    format!("{currency} {}", format_amount(amount))
}
