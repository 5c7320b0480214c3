//! The ordered line-item list and its mutation rules.
//!
//! # Invariants
//!
//! - At most one row per [`ItemId`].
//! - Every row has a quantity of at least one.
//! - Rows keep insertion order. Re-adding an existing id bumps its quantity in
//!   place; new ids are appended.
//!
//! Count and total are derived on every call and never cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ItemId, LineItem, NewLineItem, Quantity};

/// Errors raised when rebuilding a cart from stored rows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Two stored rows share the same id.
    #[error("duplicate cart row for item {0}")]
    DuplicateItem(ItemId),
}

/// What `Cart::add` did with the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was already present; its quantity grew in place.
    Merged { position: usize, quantity: Quantity },
    /// A new row was appended at `position`.
    Appended { position: usize },
}

/// What `Cart::decrease` did with the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecreaseOutcome {
    /// The row is still present with the new quantity.
    Decremented(Quantity),
    /// The row was at one unit and has been removed.
    Removed(LineItem),
}

/// Shopping cart: an ordered list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateItem`] if two rows share an id.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartError> {
        for (i, item) in items.iter().enumerate() {
            if items.iter().take(i).any(|earlier| earlier.id == item.id) {
                return Err(CartError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Rows in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Row for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Position of the row for `id`.
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Id of the row currently rendered at `index`.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<&ItemId> {
        self.items.get(index).map(|item| &item.id)
    }

    /// Sum of quantities over all rows.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of price times quantity over all rows.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Add a product, merging into an existing row with the same id.
    pub fn add(&mut self, item: NewLineItem) -> AddOutcome {
        let requested = item.requested_quantity();
        if let Some(position) = self.position(&item.id) {
            if let Some(row) = self.items.get_mut(position) {
                row.quantity = row.quantity.saturating_add(requested);
                return AddOutcome::Merged {
                    position,
                    quantity: row.quantity,
                };
            }
        }
        self.items.push(item.into_line_item());
        AddOutcome::Appended {
            position: self.items.len() - 1,
        }
    }

    /// Add one unit to the row for `id`. Returns the new quantity.
    pub fn increase(&mut self, id: &ItemId) -> Option<Quantity> {
        let row = self.items.iter_mut().find(|item| &item.id == id)?;
        row.quantity = row.quantity.saturating_add(Quantity::ONE);
        Some(row.quantity)
    }

    /// Remove one unit from the row for `id`, dropping the row at zero.
    pub fn decrease(&mut self, id: &ItemId) -> Option<DecreaseOutcome> {
        let position = self.position(id)?;
        let row = self.items.get_mut(position)?;
        match row.quantity.decremented() {
            Some(quantity) => {
                row.quantity = quantity;
                Some(DecreaseOutcome::Decremented(quantity))
            }
            None => Some(DecreaseOutcome::Removed(self.items.remove(position))),
        }
    }

    /// Remove the row for `id` regardless of its quantity.
    pub fn remove(&mut self, id: &ItemId) -> Option<LineItem> {
        let position = self.position(id)?;
        Some(self.items.remove(position))
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::Price;

    fn product(id: &str, price: u32, quantity: Option<u32>) -> NewLineItem {
        NewLineItem {
            id: ItemId::from(id),
            name: format!("Hijab {id}"),
            image: format!("/img/{id}.jpg"),
            color: "Ivory".to_string(),
            price: Price::from_rupees(price),
            quantity,
        }
    }

    fn ids(cart: &Cart) -> Vec<String> {
        cart.items().iter().map(|item| item.id.to_string()).collect()
    }

    #[test]
    fn test_merge_then_drain() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, Some(1)));
        let outcome = cart.add(product("A", 500, Some(2)));

        assert_eq!(
            outcome,
            AddOutcome::Merged {
                position: 0,
                quantity: Quantity::new(3).unwrap()
            }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Decimal::new(1500, 0));

        let a = ItemId::from("A");
        assert!(matches!(
            cart.decrease(&a),
            Some(DecreaseOutcome::Decremented(q)) if q.get() == 2
        ));
        assert!(matches!(
            cart.decrease(&a),
            Some(DecreaseOutcome::Decremented(q)) if q.get() == 1
        ));
        assert!(matches!(cart.decrease(&a), Some(DecreaseOutcome::Removed(_))));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_insertion_order_survives_readd() {
        let mut cart = Cart::new();
        cart.add(product("X", 100, None));
        cart.add(product("Y", 200, None));
        assert_eq!(ids(&cart), ["X", "Y"]);

        cart.add(product("X", 100, None));
        assert_eq!(ids(&cart), ["X", "Y"]);
        assert_eq!(cart.items()[0].quantity.get(), 2);
    }

    #[test]
    fn test_color_is_not_a_merge_key() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, None));
        let mut other_color = product("A", 500, None);
        other_color.color = "Black".to_string();
        cart.add(other_color);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].color, "Ivory");
    }

    #[test]
    fn test_rows_match_distinct_ids() {
        let adds = [
            ("A", 2),
            ("B", 1),
            ("A", 3),
            ("C", 4),
            ("B", 5),
            ("A", 1),
        ];
        let mut cart = Cart::new();
        for (id, qty) in adds {
            cart.add(product(id, 10, Some(qty)));
        }

        assert_eq!(ids(&cart), ["A", "B", "C"]);
        for (id, expected) in [("A", 6), ("B", 6), ("C", 4)] {
            let row = cart.get(&ItemId::from(id)).unwrap();
            assert_eq!(row.quantity.get(), expected, "quantity for {id}");
        }
    }

    #[test]
    fn test_count_and_total_track_every_mutation() {
        let mut cart = Cart::new();
        cart.add(product("A", 450, Some(2)));
        cart.add(product("B", 1200, None));
        cart.add(product("C", 75, Some(4)));
        cart.increase(&ItemId::from("B"));
        cart.decrease(&ItemId::from("C"));
        cart.remove(&ItemId::from("A"));
        cart.add(product("A", 450, None));

        let recount: u64 = cart
            .items()
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum();
        let retotal: Decimal = cart.items().iter().map(LineItem::line_total).sum();
        assert_eq!(cart.count(), recount);
        assert_eq!(cart.total(), retotal);
        assert_eq!(cart.count(), 6);
        assert_eq!(cart.total(), Decimal::new(450 + 2 * 1200 + 3 * 75, 0));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, None));
        let before = cart.clone();
        let ghost = ItemId::from("ghost");

        assert_eq!(cart.increase(&ghost), None);
        assert_eq!(cart.decrease(&ghost), None);
        assert_eq!(cart.remove(&ghost), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_ignores_quantity() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, Some(7)));
        cart.add(product("B", 300, None));

        let removed = cart.remove(&ItemId::from("A")).unwrap();
        assert_eq!(removed.quantity.get(), 7);
        assert_eq!(ids(&cart), ["B"]);
        assert_eq!(cart.id_at(0), Some(&ItemId::from("B")));
        assert_eq!(cart.id_at(1), None);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, None));
        cart.add(product("B", 300, None));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let mut cart = Cart::new();
        cart.add(product("Z", 999, Some(2)));
        cart.add(product("A", 150, None));
        cart.add(NewLineItem {
            id: ItemId::from(42),
            ..product("n", 1, Some(5))
        });

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
        assert_eq!(ids(&restored), ["Z", "A", "42"]);
    }

    #[test]
    fn test_stored_schema() {
        let mut cart = Cart::new();
        cart.add(product("A", 500, Some(2)));
        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": "A",
                "name": "Hijab A",
                "image": "/img/A.jpg",
                "color": "Ivory",
                "price": 500,
                "quantity": 2
            }])
        );
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let row = r#"{"id":"A","name":"n","image":"i","color":"c","price":1,"quantity":1}"#;
        let json = format!("[{row},{row}]");
        assert!(serde_json::from_str::<Cart>(&json).is_err());
        assert!(serde_json::from_str::<Cart>(r#"{"items":[]}"#).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { id: u8, price: u32, quantity: Option<u32> },
        Increase(u8),
        Decrease(u8),
        Remove(u8),
        Clear,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let id = 0u8..6;
        prop_oneof![
            4 => (id.clone(), 1u32..5_000, proptest::option::of(0u32..5))
                .prop_map(|(id, price, quantity)| Op::Add { id, price, quantity }),
            2 => id.clone().prop_map(Op::Increase),
            2 => id.clone().prop_map(Op::Decrease),
            1 => id.prop_map(Op::Remove),
            1 => Just(Op::Clear),
        ]
    }

    fn apply(cart: &mut Cart, op: Op) {
        match op {
            Op::Add { id, price, quantity } => {
                cart.add(product(&id.to_string(), price, quantity));
            }
            Op::Increase(id) => {
                cart.increase(&ItemId::from(id.to_string()));
            }
            Op::Decrease(id) => {
                cart.decrease(&ItemId::from(id.to_string()));
            }
            Op::Remove(id) => {
                cart.remove(&ItemId::from(id.to_string()));
            }
            Op::Clear => cart.clear(),
        }
    }

    proptest! {
        #[test]
        fn property_cart_rules_hold_after_any_mutations(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut cart = Cart::new();
            for op in ops {
                apply(&mut cart, op);

                let mut distinct = ids(&cart);
                distinct.sort();
                distinct.dedup();
                prop_assert_eq!(distinct.len(), cart.len());
                prop_assert!(cart.items().iter().all(|item| item.quantity.get() >= 1));

                let count: u64 = cart.items().iter().map(|item| u64::from(item.quantity.get())).sum();
                let total: Decimal = cart
                    .items()
                    .iter()
                    .map(|item| item.price.amount() * Decimal::from(item.quantity.get()))
                    .sum();
                prop_assert_eq!(cart.count(), count);
                prop_assert_eq!(cart.total(), total);
            }

            let json = serde_json::to_string(&cart).unwrap();
            let restored: Cart = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(restored, cart);
        }
    }
}
