//! Core types for the SereNya cart.
//!
//! This module provides type-safe wrappers for the values a line item carries.

pub mod id;
pub mod line_item;
pub mod price;

pub use id::ItemId;
pub use line_item::{LineItem, NewLineItem, Quantity};
pub use price::{Price, PriceError, format_amount};
