//! Order types for the mealflow system.
//!
//! This module defines the order entity, its line items and the status
//! vocabulary used throughout the order lifecycle. Status values serialize
//! in the SCREAMING_SNAKE_CASE form the HTTP clients expect.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Status of an order in the delivery pipeline.
///
/// `Completed` and `Cancelled` are terminal: once an order reaches either,
/// no further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Placed by the customer, awaiting restaurant confirmation.
	Pending,
	/// Accepted by the restaurant.
	Confirmed,
	/// Restaurant is preparing the food.
	Processing,
	/// Ready to be claimed by a delivery person.
	ReadyForPickup,
	/// Claimed and on its way to the customer.
	OutForDelivery,
	/// Delivered to the customer.
	Completed,
	/// Cancelled before pickup.
	Cancelled,
}

impl OrderStatus {
	/// Returns true for states from which no further transition is allowed.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}

	/// The happy-path progression, in order, used for display and audit.
	///
	/// `Cancelled` is a side-terminal reachable from any non-terminal state
	/// under role constraints and is deliberately not part of this list.
	pub fn progression() -> [OrderStatus; 6] {
		[
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::Processing,
			OrderStatus::ReadyForPickup,
			OrderStatus::OutForDelivery,
			OrderStatus::Completed,
		]
	}

	/// Wire representation, matching the serde encoding.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Confirmed => "CONFIRMED",
			OrderStatus::Processing => "PROCESSING",
			OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
			OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
			OrderStatus::Completed => "COMPLETED",
			OrderStatus::Cancelled => "CANCELLED",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"PENDING" => Ok(OrderStatus::Pending),
			"CONFIRMED" => Ok(OrderStatus::Confirmed),
			"PROCESSING" => Ok(OrderStatus::Processing),
			"READY_FOR_PICKUP" => Ok(OrderStatus::ReadyForPickup),
			"OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
			"COMPLETED" => Ok(OrderStatus::Completed),
			"CANCELLED" => Ok(OrderStatus::Cancelled),
			_ => Err(()),
		}
	}
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
	CreditCard,
	DebitCard,
	Paypal,
	CashOnDelivery,
	Wallet,
}

/// A single line item on an order.
///
/// The name and unit price are resolved from the restaurant menu at
/// creation time and frozen on the order, so later menu edits never
/// reprice an in-flight order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	/// Menu item this line was priced from.
	pub menu_item_id: Uuid,
	/// Menu item name at the time of ordering.
	pub name: String,
	/// Number of units ordered; always >= 1.
	pub quantity: u32,
	/// Price per unit at the time of ordering.
	pub unit_price: Decimal,
	/// Free-form per-item instructions ("no onions").
	#[serde(skip_serializing_if = "Option::is_none")]
	pub special_instructions: Option<String>,
}

impl OrderItem {
	/// Extended price for this line.
	pub fn line_total(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}

/// Monetary breakdown of an order, fixed at creation.
///
/// Invariant: `total == subtotal + delivery_fee + tax`, exactly. Tax is
/// rounded to cents before the sum so the invariant holds in `Decimal`
/// arithmetic with no residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
	pub subtotal: Decimal,
	pub delivery_fee: Decimal,
	pub tax: Decimal,
	pub total: Decimal,
}

/// A customer order moving through the delivery pipeline.
///
/// All fields except `status`, `status_updated_at` and
/// `delivery_person_id` are immutable after creation, and those three
/// change only through validated status transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier, assigned at creation.
	pub id: Uuid,
	/// Customer who placed the order.
	pub customer_id: Uuid,
	/// Restaurant the order was placed against.
	pub restaurant_id: Uuid,
	/// Delivery person, set exactly once when the order is claimed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_person_id: Option<Uuid>,
	/// Line items, immutable after creation.
	pub items: Vec<OrderItem>,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Where the order is delivered to.
	pub delivery_address: String,
	/// Order-level instructions for the restaurant or courier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub special_instructions: Option<String>,
	/// Contact number for the courier. Required at checkout.
	pub phone_number: String,
	/// How the customer pays.
	pub payment_method: PaymentMethod,
	/// Monetary breakdown, fixed at creation.
	#[serde(flatten)]
	pub totals: OrderTotals,
	/// When the order was placed.
	pub created_at: DateTime<Utc>,
	/// Refreshed on every valid status transition.
	pub status_updated_at: DateTime<Utc>,
}

impl Order {
	/// True once the order can no longer change in any way.
	pub fn is_finalized(&self) -> bool {
		self.status.is_terminal()
	}
}
