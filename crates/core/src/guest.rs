//! Guest cart and compare lists.
//!
//! Visitors who are not logged in keep their cart and comparison set in local
//! storage as JSON arrays. These types are the in-memory shape of those arrays
//! and own the counting rules the header badges rely on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// One line of a guest cart as stored under `cart_guest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartLine {
    #[serde(alias = "id", alias = "_id")]
    pub product_id: ProductId,
    /// Missing quantities count as 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Snapshot taken when the line was added, shown if the product lookup fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl GuestCartLine {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity: Some(quantity),
            size: None,
            color: None,
            name: None,
            price: None,
            image: None,
        }
    }

    /// Effective quantity, defaulting to 1.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    fn same_variant(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.size == other.size && self.color == other.color
    }
}

/// The full guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestCart(Vec<GuestCartLine>);

impl GuestCart {
    #[must_use]
    pub const fn new(lines: Vec<GuestCartLine>) -> Self {
        Self(lines)
    }

    #[must_use]
    pub fn lines(&self) -> &[GuestCartLine] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of line quantities; what the cart badge shows.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.0
            .iter()
            .map(GuestCartLine::quantity)
            .fold(0, u32::saturating_add)
    }

    /// Add a line, merging into an existing line for the same product variant.
    pub fn add(&mut self, line: GuestCartLine) {
        if let Some(existing) = self.0.iter_mut().find(|l| l.same_variant(&line)) {
            existing.quantity = Some(existing.quantity().saturating_add(line.quantity()));
        } else {
            self.0.push(line);
        }
    }

    /// Set the quantity of the line at `index`; zero removes it.
    /// Returns `false` when there is no such line.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(index);
        }
        match self.0.get_mut(index) {
            Some(line) => {
                line.quantity = Some(quantity);
                true
            }
            None => false,
        }
    }

    /// Remove the line at `index`. Returns `false` when there is no such line.
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.0.len() {
            self.0.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Product ids a guest is comparing, stored under `compareItems`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestCompare(Vec<ProductId>);

impl GuestCompare {
    #[must_use]
    pub const fn new(ids: Vec<ProductId>) -> Self {
        Self(ids)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.0.contains(&id)
    }

    /// Add a product. Returns `false` if it was already being compared.
    pub fn add(&mut self, id: ProductId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove a product. Returns `false` if it was not being compared.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| *existing != id);
        before != self.0.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_total_quantity_defaults_missing_to_one() {
        let cart: GuestCart = serde_json::from_str(
            r#"[{"productId": 1, "quantity": 3}, {"productId": 2}, {"_id": 3, "quantity": 2}]"#,
        )
        .unwrap();
        assert_eq!(cart.total_quantity(), 6);
    }

    #[test]
    fn test_round_trip_preserves_total() {
        let mut cart = GuestCart::default();
        for (id, qty) in [(1, 2), (2, 5), (3, 1)] {
            cart.add(GuestCartLine::new(ProductId::new(id), qty));
        }
        let json = serde_json::to_string(&cart).unwrap();
        let restored: GuestCart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.total_quantity(), 8);
    }

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = GuestCart::default();
        let mut medium = GuestCartLine::new(ProductId::new(7), 1);
        medium.size = Some("M".to_string());
        let mut large = medium.clone();
        large.size = Some("L".to_string());

        cart.add(medium.clone());
        cart.add(medium);
        cart.add(large);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity(), 2);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = GuestCart::new(vec![GuestCartLine::new(ProductId::new(1), 2)]);
        assert!(cart.set_quantity(0, 4));
        assert_eq!(cart.total_quantity(), 4);
        assert!(cart.set_quantity(0, 0));
        assert!(cart.is_empty());
        assert!(!cart.set_quantity(3, 1));
    }

    #[test]
    fn test_compare_dedupes() {
        let mut compare = GuestCompare::default();
        assert!(compare.add(ProductId::new(1)));
        assert!(!compare.add(ProductId::new(1)));
        assert!(compare.add(ProductId::new(2)));
        assert_eq!(compare.len(), 2);
        assert!(compare.remove(ProductId::new(1)));
        assert!(!compare.remove(ProductId::new(1)));
        assert_eq!(serde_json::to_string(&compare).unwrap(), "[2]");
    }
}
