//! Delivery address types.

use serde::{Deserialize, Serialize};

/// Category of a saved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[default]
    Home,
    Work,
    Other,
}

/// A saved delivery address.
///
/// The profile service guarantees at most one address per user has
/// `is_default = true`; the client consumes that as given and never
/// re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Recipient name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Street address.
    pub line1: String,
    /// Optional landmark for the delivery rider.
    pub landmark: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub pincode: String,
    /// Address category.
    #[serde(rename = "type")]
    pub kind: AddressKind,
    /// Whether this is the user's default address.
    pub is_default: bool,
}
