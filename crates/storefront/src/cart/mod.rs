//! Cart store, its derived view and the checkout hand-off.
//!
//! The list rules live in `serenya_core::Cart`; this module adds persistence,
//! rendering and the hand-off to the checkout page.

pub mod checkout;
pub mod store;
pub mod view;

pub use checkout::{CHECKOUT_CART_KEY, CHECKOUT_TOTAL_KEY, CheckoutHandoff};
pub use store::{
    CartSettings, CartStore, CartUpdate, CheckoutOutcome, LoadOutcome, PersistStatus,
};
pub use view::{CartItemView, CartView};
