//! Delivery claim coordination.
//!
//! A claim is the only contended write path in the system: any number of
//! couriers may race to accept the same ReadyForPickup order, and exactly one
//! may win. The coordinator leans entirely on the store's compare-and-swap:
//! the winner's write moves the order to OutForDelivery with the courier
//! recorded, and every loser observes a status that is no longer
//! ReadyForPickup.

use std::sync::Arc;
use uuid::Uuid;

use mealflow_types::{Order, OrderStatus};

use crate::error::OrderFlowError;
use crate::store::{OrderStore, StoreError};

/// Coordinates claim attempts so at most one courier is ever assigned.
pub struct AssignmentCoordinator {
	orders: Arc<OrderStore>,
}

impl AssignmentCoordinator {
	pub fn new(orders: Arc<OrderStore>) -> Self {
		Self { orders }
	}

	/// Attempts to claim `order_id` for `delivery_person_id`.
	///
	/// Succeeds only if the order is still ReadyForPickup at write time;
	/// status and assignee are committed in the same write. A race loser gets
	/// [`OrderFlowError::AlreadyClaimed`] with the status actually found, so
	/// the client can refresh its available-orders view without another
	/// round trip.
	pub async fn claim(
		&self,
		order_id: Uuid,
		delivery_person_id: Uuid,
	) -> Result<Order, OrderFlowError> {
		let result = self
			.orders
			.cas_update_status(order_id, OrderStatus::ReadyForPickup, |order| {
				order.status = OrderStatus::OutForDelivery;
				order.delivery_person_id = Some(delivery_person_id);
			})
			.await;

		match result {
			Ok(order) => Ok(order),
			Err(StoreError::NotFound) => Err(OrderFlowError::OrderNotFound(order_id)),
			Err(StoreError::Conflict { actual }) => Err(OrderFlowError::AlreadyClaimed {
				current_status: actual,
			}),
			Err(other) => Err(other.into()),
		}
	}
}
