//! Restaurant and menu item types.
//!
//! Restaurants own the fee schedule applied at checkout; menu items carry
//! the unit prices orders are priced from. Ownership (`owner_id`) is what
//! staff-side authorization checks against.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A restaurant registered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
	pub id: Uuid,
	/// Staff account that owns this restaurant.
	pub owner_id: Uuid,
	pub name: String,
	pub address: String,
	/// Flat fee added to every order from this restaurant.
	pub delivery_fee: Decimal,
	pub created_at: DateTime<Utc>,
}

/// An orderable item on a restaurant menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
	pub id: Uuid,
	pub restaurant_id: Uuid,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub price: Decimal,
	/// Unavailable items cannot be ordered but stay on the menu.
	pub available: bool,
}
