//! Wire-shape decoding and normalization.
//!
//! The backend's JSON uses camelCase and has grown some historical warts:
//! orders may carry their status under a legacy `status` field instead of
//! `orderStatus`, and wishlist entries arrive either flat or nested under
//! an `item.product` envelope. Both are modeled here as explicit wire types
//! and normalized into the canonical domain records at this boundary, so
//! the rest of the engine never probes for alternate shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use kirana_core::{
    Address, AddressKind, Order, OrderId, OrderLine, OrderStatus, PaymentMethod, ProductId,
    ProductSnapshot, WishlistEntry,
};

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireOrder {
    #[serde(alias = "id")]
    order_id: OrderId,
    order_number: String,
    items: Vec<WireOrderLine>,
    delivery_address: WireAddress,
    subtotal: Decimal,
    delivery_fee: Decimal,
    tax: Decimal,
    total_amount: Decimal,
    payment_method: PaymentMethod,
    /// Current field name.
    #[serde(default)]
    order_status: Option<OrderStatus>,
    /// Legacy field name still emitted by older backend builds.
    #[serde(default)]
    status: Option<OrderStatus>,
    created_at: DateTime<Utc>,
}

impl WireOrder {
    /// Normalize so `order_status` is always populated, falling back to the
    /// legacy field and then to `pending`.
    pub(crate) fn normalize(self) -> Order {
        Order {
            order_id: self.order_id,
            order_number: self.order_number,
            items: self.items.into_iter().map(WireOrderLine::normalize).collect(),
            delivery_address: self.delivery_address.normalize(),
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            tax: self.tax,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            order_status: self.order_status.or(self.status).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOrderLine {
    #[serde(alias = "productRef")]
    product_id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
    line_total: Decimal,
}

impl WireOrderLine {
    fn normalize(self) -> OrderLine {
        OrderLine {
            product_id: self.product_id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            line_total: self.line_total,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
    name: String,
    phone: String,
    line1: String,
    #[serde(default)]
    landmark: Option<String>,
    city: String,
    state: String,
    pincode: String,
    #[serde(rename = "type", default)]
    kind: AddressKind,
    #[serde(default)]
    is_default: bool,
}

impl WireAddress {
    fn normalize(self) -> Address {
        Address {
            name: self.name,
            phone: self.phone,
            line1: self.line1,
            landmark: self.landmark,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            kind: self.kind,
            is_default: self.is_default,
        }
    }
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProduct {
    id: ProductId,
    name: String,
    #[serde(alias = "price")]
    unit_price: Decimal,
    #[serde(default)]
    stock: u32,
    #[serde(default)]
    image_url: Option<String>,
}

impl WireProduct {
    fn normalize(self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name,
            unit_price: self.unit_price,
            stock: self.stock,
            image_url: self.image_url,
        }
    }
}

/// A wishlist entry as the backend sends it: either flat, or with the
/// product nested under an `item` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireWishlistEntry {
    Enveloped {
        item: WireWishlistItem,
        #[serde(rename = "addedAt", default)]
        added_at: Option<DateTime<Utc>>,
    },
    Flat {
        product: WireProduct,
        #[serde(rename = "addedAt", default)]
        added_at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireWishlistItem {
    product: WireProduct,
}

impl WireWishlistEntry {
    /// Flatten either shape into the canonical entry. A missing `addedAt`
    /// is stamped with the current time so ordering stays total.
    pub(crate) fn normalize(self) -> WishlistEntry {
        let (product, added_at) = match self {
            Self::Enveloped { item, added_at } => (item.product, added_at),
            Self::Flat { product, added_at } => (product, added_at),
        };
        let product = product.normalize();
        WishlistEntry {
            product_id: product.id.clone(),
            product,
            added_at: added_at.unwrap_or_else(Utc::now),
        }
    }
}
