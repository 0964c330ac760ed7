//! Cart line item type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::ProductSnapshot;

/// A line item in the cart.
///
/// Invariant: `1 <= quantity <= stock`. The cart store enforces this by
/// clamping; a quantity driven to zero removes the line entirely, so a
/// stored line never has `quantity == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Price per unit in rupees at add time.
    pub unit_price: Decimal,
    /// Units available at add time; the upper bound for `quantity`.
    pub stock: u32,
    /// Units in the cart.
    pub quantity: u32,
}

impl CartLine {
    /// Create a line for a product with an initial quantity.
    ///
    /// The quantity is clamped to `[1, stock]`; callers wanting zero should
    /// not create a line at all.
    #[must_use]
    pub fn new(product: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            stock: product.stock,
            quantity: quantity.clamp(1, product.stock.max(1)),
        }
    }

    /// Total for this line: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new("p-1"),
            name: "Toor Dal 1kg".to_string(),
            unit_price: Decimal::from(180),
            stock,
            image_url: None,
        }
    }

    #[test]
    fn new_clamps_quantity_to_stock() {
        let line = CartLine::new(&snapshot(3), 10);
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn new_never_creates_zero_quantity() {
        let line = CartLine::new(&snapshot(5), 0);
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let line = CartLine::new(&snapshot(10), 3);
        assert_eq!(line.line_total(), Decimal::from(540));
    }
}
