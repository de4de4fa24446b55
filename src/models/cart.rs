use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Content;

/// A line in a user's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub content_id: Uuid,
    pub title: String,
    /// Unit price in cents
    pub price_cents: i64,
    pub quantity: u32,
}

/// Per-user shopping cart, session-scoped
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds an item, accumulating quantity when the item is already present.
    /// A non-positive quantity leaves the cart untouched; oversized quantities
    /// clamp to `u32::MAX` rather than truncate.
    pub fn add_item(&mut self, content: &Content, quantity: i64) {
        if quantity <= 0 {
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(existing) = self.items.iter_mut().find(|i| i.content_id == content.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                content_id: content.id,
                title: content.title.clone(),
                price_cents: content.price_cents,
                quantity,
            });
        }
    }

    /// Sets the quantity for an item. A quantity of zero or less removes it.
    /// Returns false when the item is not in the cart.
    pub fn update_quantity(&mut self, content_id: Uuid, quantity: i64) -> bool {
        let Some(position) = self.items.iter().position(|i| i.content_id == content_id) else {
            return false;
        };
        if quantity <= 0 {
            self.items.remove(position);
        } else {
            self.items[position].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Removes an item. Returns false when the item is not in the cart.
    pub fn remove_item(&mut self, content_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.content_id != content_id);
        self.items.len() < before
    }

    /// Sum of price x quantity over all items, in cents
    pub fn total_cents(&self) -> i64 {
        self.items
            .iter()
            .map(|i| i.price_cents * i.quantity as i64)
            .sum()
    }

    /// Sum of quantities over all items
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Empties the cart
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    fn book(title: &str, price_cents: i64) -> Content {
        Content::new(title, "Author", "Fiction", ContentType::Ebook, price_cents)
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new();
        assert_eq!(cart.total_cents(), 0);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_totals_track_mutations() {
        let mut cart = Cart::new();
        let a = book("A", 1000);
        let b = book("B", 250);

        cart.add_item(&a, 2);
        cart.add_item(&b, 1);
        assert_eq!(cart.total_cents(), 2250);
        assert_eq!(cart.count(), 3);

        assert!(cart.update_quantity(b.id, 4));
        assert_eq!(cart.total_cents(), 3000);
        assert_eq!(cart.count(), 6);

        assert!(cart.remove_item(a.id));
        assert_eq!(cart.total_cents(), 1000);
        assert_eq!(cart.count(), 4);
    }

    #[test]
    fn test_add_same_item_accumulates() {
        let mut cart = Cart::new();
        let a = book("A", 500);
        cart.add_item(&a, 1);
        cart.add_item(&a, 2);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_non_positive_quantity_removes() {
        let mut cart = Cart::new();
        let a = book("A", 500);
        cart.add_item(&a, 1);

        assert!(cart.update_quantity(a.id, 0));
        assert!(cart.items.is_empty());

        cart.add_item(&a, 1);
        assert!(cart.update_quantity(a.id, -3));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_add_non_positive_quantity_is_noop() {
        let mut cart = Cart::new();
        let a = book("A", 500);
        cart.add_item(&a, 0);
        cart.add_item(&a, -1);
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_oversized_quantity_clamps_instead_of_truncating() {
        let mut cart = Cart::new();
        let a = book("A", 500);

        // Larger than u32: must never wrap around to a zero-quantity line
        cart.add_item(&a, (u32::MAX as i64) + 1);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, u32::MAX);
        assert_eq!(cart.count(), u32::MAX as u64);

        assert!(cart.update_quantity(a.id, 1 << 40));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, u32::MAX);
        assert_ne!(cart.count(), 0);
    }

    #[test]
    fn test_accumulation_saturates() {
        let mut cart = Cart::new();
        let a = book("A", 500);
        cart.add_item(&a, u32::MAX as i64);
        cart.add_item(&a, 5);
        assert_eq!(cart.items[0].quantity, u32::MAX);
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(&book("A", 500), 2);
        cart.add_item(&book("B", 300), 1);

        cart.clear();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_cents(), 0);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_missing_item_updates() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity(Uuid::new_v4(), 2));
        assert!(!cart.remove_item(Uuid::new_v4()));
    }
}
