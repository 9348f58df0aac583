//! Actor identity types used for authorization decisions.
//!
//! Every authenticated request carries an [`AuthClaims`] extracted from the
//! bearer credential. The role is always taken from the credential, never
//! from a request body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Places and cancels their own orders.
	Customer,
	/// Manages restaurants they own and drives kitchen-side transitions.
	RestaurantStaff,
	/// Claims ready orders and drives delivery-side transitions.
	DeliveryPersonnel,
	/// Read-only access to everything; no transition edges.
	Admin,
}

impl Role {
	/// Token-segment representation (lower snake case).
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Customer => "customer",
			Role::RestaurantStaff => "restaurant_staff",
			Role::DeliveryPersonnel => "delivery_personnel",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customer" => Ok(Role::Customer),
			"restaurant_staff" => Ok(Role::RestaurantStaff),
			"delivery_personnel" => Ok(Role::DeliveryPersonnel),
			"admin" => Ok(Role::Admin),
			_ => Err(()),
		}
	}
}

/// Verified identity of the caller, derived from the bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
	/// Stable actor id (customer, staff member or courier).
	pub actor_id: Uuid,
	/// Role the credential was issued for.
	pub role: Role,
}

impl AuthClaims {
	pub fn new(actor_id: Uuid, role: Role) -> Self {
		Self { actor_id, role }
	}
}
