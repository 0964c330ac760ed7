//! Money formatting helpers.
//!
//! All monetary amounts in the client are `rust_decimal::Decimal` values in
//! rupees. The backend is single-currency, so there is no currency code on
//! the wire; formatting is display-only.

use rust_decimal::Decimal;

/// Format a rupee amount for display (e.g., "₹499.50", "₹30").
///
/// Whole-rupee amounts are shown without a fractional part, everything else
/// with two decimal places.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    if amount.fract().is_zero() {
        format!("₹{}", amount.trunc())
    } else {
        format!("₹{amount:.2}")
    }
}
