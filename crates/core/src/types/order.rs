//! Order types: frozen line snapshots, drafts, and the order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::cart::CartLine;
use super::id::{OrderId, ProductId};
use super::status::OrderStatus;

/// How the user pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Upi,
    Card,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "Cash on delivery"),
            Self::Upi => write!(f, "UPI"),
            Self::Card => write!(f, "Card"),
        }
    }
}

/// An immutable line snapshot inside an order.
///
/// Captured from the cart at order-creation time. Later catalog changes
/// (price, name, stock) must never show through here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product the snapshot was taken from.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Price per unit at order time, in rupees.
    pub unit_price: Decimal,
    /// Units ordered.
    pub quantity: u32,
    /// `unit_price * quantity` at order time.
    pub line_total: Decimal,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}

/// A draft sent to the backend to create an order.
///
/// Address presence is enforced by the type: a draft cannot be constructed
/// without one. Emptiness of `items` is validated by the order store before
/// any network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Line snapshots taken from the cart.
    pub items: Vec<OrderLine>,
    /// Where to deliver.
    pub delivery_address: Address,
    /// How the user pays.
    pub payment_method: PaymentMethod,
    /// Free-text instructions for the rider.
    pub notes: Option<String>,
}

impl OrderDraft {
    /// Build a draft by snapshotting the given cart lines.
    #[must_use]
    pub fn from_cart_lines(
        lines: &[CartLine],
        delivery_address: Address,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            items: lines.iter().map(OrderLine::from).collect(),
            delivery_address,
            payment_method,
            notes: None,
        }
    }
}

/// An order as confirmed by the backend.
///
/// Orders are created only by a successful remote call, never purely
/// locally, and are never hard-deleted on the client; cancellation is a
/// status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Backend-assigned order ID.
    pub order_id: OrderId,
    /// Human-facing order number (e.g., "KIR-20260807-0042").
    pub order_number: String,
    /// Frozen line snapshots.
    pub items: Vec<OrderLine>,
    /// Delivery address captured at order time.
    pub delivery_address: Address,
    /// Sum of line totals, in rupees.
    pub subtotal: Decimal,
    /// Delivery fee charged.
    pub delivery_fee: Decimal,
    /// Tax charged.
    pub tax: Decimal,
    /// Grand total charged.
    pub total_amount: Decimal,
    /// Payment method chosen.
    pub payment_method: PaymentMethod,
    /// Current lifecycle status.
    pub order_status: OrderStatus,
    /// When the backend created the order.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddressKind, ProductSnapshot};

    fn cart_line() -> CartLine {
        CartLine::new(
            &ProductSnapshot {
                id: ProductId::new("p-1"),
                name: "Basmati Rice 5kg".to_string(),
                unit_price: Decimal::from(450),
                stock: 8,
                image_url: None,
            },
            2,
        )
    }

    #[test]
    fn order_line_freezes_cart_values() {
        let line = cart_line();
        let snapshot = OrderLine::from(&line);
        assert_eq!(snapshot.unit_price, Decimal::from(450));
        assert_eq!(snapshot.quantity, 2);
        assert_eq!(snapshot.line_total, Decimal::from(900));
    }

    #[test]
    fn draft_snapshots_every_line() {
        let address = Address {
            name: "A. Kumar".to_string(),
            phone: "9876543210".to_string(),
            line1: "12 MG Road".to_string(),
            landmark: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            kind: AddressKind::Home,
            is_default: true,
        };
        let draft =
            OrderDraft::from_cart_lines(&[cart_line()], address, PaymentMethod::Upi);
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.payment_method, PaymentMethod::Upi);
    }
}
