//! Line items: one row of the cart per distinct product configuration.

use core::fmt;
use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ItemId, Price};

/// Number of units on a line item. Always at least one.
///
/// Zero is unrepresentable: a persisted row with `"quantity": 0` fails to
/// deserialize, and decrementing a quantity of one yields `None` so the caller
/// removes the row instead of storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(units: u32) -> Option<Self> {
        match NonZeroU32::new(units) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Get the number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add `other` units, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }

    /// Remove one unit, or `None` if this was the last one.
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        Self::new(self.0.get() - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored cart row.
///
/// The persisted schema is exactly `{id, name, image, color, price, quantity}`;
/// every field is required when reading a saved cart back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    /// Product image URL.
    pub image: String,
    /// Display-only colour label. Not part of the row identity.
    pub color: String,
    pub price: Price,
    pub quantity: Quantity,
}

impl LineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity.get())
    }
}

/// Descriptor handed to the cart by an "add to cart" action.
///
/// `quantity` is optional; a missing or zero quantity adds a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ItemId,
    pub name: String,
    pub image: String,
    pub color: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl NewLineItem {
    /// The number of units this descriptor asks for.
    #[must_use]
    pub fn requested_quantity(&self) -> Quantity {
        self.quantity.and_then(Quantity::new).unwrap_or_default()
    }

    /// Turn the descriptor into a stored row with the requested quantity.
    #[must_use]
    pub fn into_line_item(self) -> LineItem {
        let quantity = self.requested_quantity();
        LineItem {
            id: self.id,
            name: self.name,
            image: self.image,
            color: self.color,
            price: self.price,
            quantity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn descriptor(quantity: Option<u32>) -> NewLineItem {
        NewLineItem {
            id: ItemId::from("A"),
            name: "Chiffon Hijab".to_string(),
            image: "/img/chiffon.jpg".to_string(),
            color: "Rose".to_string(),
            price: Price::from_rupees(500),
            quantity,
        }
    }

    #[test]
    fn test_quantity_zero_is_none() {
        assert!(Quantity::new(0).is_none());
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_quantity_decrement_to_zero() {
        assert_eq!(Quantity::new(2).unwrap().decremented(), Some(Quantity::ONE));
        assert_eq!(Quantity::ONE.decremented(), None);
    }

    #[test]
    fn test_quantity_saturates() {
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.saturating_add(Quantity::ONE), max);
    }

    #[test]
    fn test_requested_quantity_defaults_to_one() {
        assert_eq!(descriptor(None).requested_quantity(), Quantity::ONE);
        assert_eq!(descriptor(Some(0)).requested_quantity(), Quantity::ONE);
        assert_eq!(descriptor(Some(4)).requested_quantity().get(), 4);
    }

    #[test]
    fn test_line_total() {
        let mut item = descriptor(Some(3)).into_line_item();
        assert_eq!(item.line_total(), Decimal::new(1500, 0));
        item.price = Price::new(Decimal::new(2_495, 1)).unwrap();
        assert_eq!(item.line_total(), Decimal::new(7_485, 1));
    }

    #[test]
    fn test_line_item_requires_all_fields() {
        let missing_color = r#"{"id":"A","name":"n","image":"i","price":1,"quantity":1}"#;
        assert!(serde_json::from_str::<LineItem>(missing_color).is_err());

        let zero_quantity = r#"{"id":"A","name":"n","image":"i","color":"c","price":1,"quantity":0}"#;
        assert!(serde_json::from_str::<LineItem>(zero_quantity).is_err());
    }

    #[test]
    fn test_descriptor_quantity_is_optional() {
        let json = r#"{"id":7,"name":"n","image":"i","color":"c","price":250}"#;
        let item: NewLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, None);
        assert_eq!(item.id, ItemId::from(7));
    }
}
