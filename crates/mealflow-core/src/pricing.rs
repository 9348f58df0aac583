//! Order pricing.
//!
//! Totals are computed once at order creation and stored on the order, so a
//! later change to a menu price or tax rate never alters an existing order.

use rust_decimal::{Decimal, RoundingStrategy};

use mealflow_types::{OrderItem, OrderTotals};

/// Computes the totals for a priced set of order items.
///
/// The tax amount is rounded to cents before summing, so the stored breakdown
/// always satisfies `total == subtotal + delivery_fee + tax` exactly.
pub fn price_order(items: &[OrderItem], delivery_fee: Decimal, tax_rate: Decimal) -> OrderTotals {
	let subtotal: Decimal = items.iter().map(|item| item.line_total()).sum();
	let tax = (subtotal * tax_rate)
		.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
	let total = subtotal + delivery_fee + tax;
	OrderTotals {
		subtotal,
		delivery_fee,
		tax,
		total,
	}
}
