//! SereNya Core - Cart model and shared types.
//!
//! This crate holds the shopping cart rules that the storefront's cart panel
//! and checkout pages build on.
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! storage access, no HTTP. Persistence and rendering live in the storefront
//! crate; everything here can be exercised with plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Item identifiers, prices, quantities and line items
//! - [`cart`] - The ordered line-item list with merge and total rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{AddOutcome, Cart, CartError, DecreaseOutcome};
pub use types::*;
