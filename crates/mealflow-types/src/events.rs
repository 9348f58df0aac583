//! Event types for intra-service lifecycle notifications.
//!
//! Events flow through a broadcast bus so that observers (logging, future
//! push channels) can react to order state changes without being on the
//! request path. Publishing is fire-and-forget; a lagging subscriber never
//! blocks or fails a state change.

use crate::{AuthClaims, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle events published by the core service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A new order was created by a customer checkout.
	Placed { order: Order },
	/// An order moved to a new status through a validated transition.
	StatusChanged {
		order_id: Uuid,
		from: OrderStatus,
		to: OrderStatus,
		actor: AuthClaims,
	},
	/// A delivery person won the claim on a ready order.
	Claimed {
		order_id: Uuid,
		delivery_person_id: Uuid,
	},
	/// An order was cancelled before pickup.
	Cancelled { order_id: Uuid, actor: AuthClaims },
}
