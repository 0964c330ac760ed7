//! Pure pricing derivation for cart contents.
//!
//! No I/O and no hidden configuration: every call site passes the
//! [`PricingConfig`] it wants applied. Identical inputs always produce
//! identical totals.

use kirana_core::CartLine;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PricingConfig;

/// Derived totals for a set of cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    /// Sum of `unit_price * quantity` over all lines.
    pub subtotal: Decimal,
    /// Flat fee, or zero at/above the free-delivery threshold.
    pub delivery_fee: Decimal,
    /// Tax on the subtotal, rounded to whole rupees.
    pub tax: Decimal,
    /// `subtotal + delivery_fee + tax`.
    pub total: Decimal,
    /// Number of distinct lines.
    pub line_count: usize,
}

impl Totals {
    /// Totals of an empty cart: all zero.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            line_count: 0,
        }
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute derived totals for `lines` under `config`.
///
/// An empty cart carries no charges at all. Otherwise:
/// - `subtotal` is the sum of line totals,
/// - `delivery_fee` is zero once `subtotal >= free_delivery_threshold`,
///   else the flat fee,
/// - `tax` is `subtotal * tax_rate` rounded to whole rupees, midpoint away
///   from zero,
/// - `total` is the sum of the three.
///
/// # Panics
///
/// In debug builds, panics on a negative unit price or a zero quantity -
/// both are caller contract violations, not recoverable input.
#[must_use]
pub fn compute_totals(lines: &[CartLine], config: &PricingConfig) -> Totals {
    for line in lines {
        debug_assert!(
            line.unit_price >= Decimal::ZERO,
            "negative unit price for {}",
            line.product_id
        );
        debug_assert!(line.quantity > 0, "zero quantity for {}", line.product_id);
    }

    if lines.is_empty() {
        return Totals::empty();
    }

    let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();

    let delivery_fee = if subtotal >= config.free_delivery_threshold {
        Decimal::ZERO
    } else {
        config.delivery_fee
    };

    let tax = (subtotal * config.tax_rate)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    Totals {
        subtotal,
        delivery_fee,
        tax,
        total: subtotal + delivery_fee + tax,
        line_count: lines.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kirana_core::{ProductId, ProductSnapshot};

    fn line(id: &str, unit_price: i64, quantity: u32) -> CartLine {
        CartLine::new(
            &ProductSnapshot {
                id: ProductId::new(id),
                name: format!("product {id}"),
                unit_price: Decimal::from(unit_price),
                stock: 100,
                image_url: None,
            },
            quantity,
        )
    }

    #[test]
    fn empty_cart_carries_no_charges() {
        let totals = compute_totals(&[], &PricingConfig::default());
        assert_eq!(totals, Totals::empty());
    }

    #[test]
    fn totals_are_deterministic() {
        let lines = vec![line("p1", 120, 2), line("p2", 45, 3)];
        let config = PricingConfig::default();
        let first = compute_totals(&lines, &config);
        let second = compute_totals(&lines, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn total_is_exactly_the_sum_of_parts() {
        for quantities in [(1, 1), (2, 5), (7, 3), (13, 1)] {
            let lines = vec![line("p1", 99, quantities.0), line("p2", 151, quantities.1)];
            let totals = compute_totals(&lines, &PricingConfig::default());
            assert_eq!(totals.total, totals.subtotal + totals.delivery_fee + totals.tax);
        }
    }

    #[test]
    fn free_delivery_boundary() {
        let config = PricingConfig::default();

        // One rupee below the threshold still pays the flat fee.
        let below = compute_totals(&[line("p1", 499, 1)], &config);
        assert_eq!(below.delivery_fee, Decimal::from(30));

        // Exactly at the threshold delivery is free.
        let at = compute_totals(&[line("p1", 500, 1)], &config);
        assert_eq!(at.delivery_fee, Decimal::ZERO);
    }

    #[test]
    fn tax_rounds_to_whole_rupees_midpoint_away_from_zero() {
        let config = PricingConfig {
            tax_rate: Decimal::new(5, 2),
            ..PricingConfig::default()
        };
        // 130 * 0.05 = 6.5 -> 7
        let totals = compute_totals(&[line("p1", 130, 1)], &config);
        assert_eq!(totals.tax, Decimal::from(7));
    }

    #[test]
    fn tax_rate_is_caller_supplied() {
        let lines = vec![line("p1", 200, 1)];
        let five = compute_totals(
            &lines,
            &PricingConfig {
                tax_rate: Decimal::new(5, 2),
                ..PricingConfig::default()
            },
        );
        let eighteen = compute_totals(
            &lines,
            &PricingConfig {
                tax_rate: Decimal::new(18, 2),
                ..PricingConfig::default()
            },
        );
        assert_eq!(five.tax, Decimal::from(10));
        assert_eq!(eighteen.tax, Decimal::from(36));
    }

    #[test]
    fn checkout_scenario_matches_product_rules() {
        // One line at 200 x 2 = 400: under the threshold, 5% tax.
        let config = PricingConfig::default();
        let two = compute_totals(&[line("p1", 200, 2)], &config);
        assert_eq!(two.subtotal, Decimal::from(400));
        assert_eq!(two.delivery_fee, Decimal::from(30));
        assert_eq!(two.tax, Decimal::from(20));
        assert_eq!(two.total, Decimal::from(450));

        // Adding a third unit crosses the free-delivery threshold.
        let three = compute_totals(&[line("p1", 200, 3)], &config);
        assert_eq!(three.subtotal, Decimal::from(600));
        assert_eq!(three.delivery_fee, Decimal::ZERO);
        assert_eq!(three.tax, Decimal::from(30));
        assert_eq!(three.total, Decimal::from(630));
    }
}
