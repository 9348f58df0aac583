//! Error taxonomy for the order flow service.
//!
//! Business-rule violations are typed results, never panics: each variant
//! carries what the caller needs to refresh its view, in particular the
//! actual current status on every rejected transition.

use thiserror::Error;
use uuid::Uuid;

use mealflow_types::{OrderStatus, Role};

use crate::state::TransitionError;
use crate::store::StoreError;

/// Errors produced by the order flow service.
#[derive(Debug, Error)]
pub enum OrderFlowError {
	/// The caller's role may not perform the requested operation.
	#[error("role {role} is not authorized for this operation")]
	Unauthorized { role: Role },
	/// The caller is authenticated but does not own the resource.
	#[error("caller does not own this resource")]
	Forbidden,
	/// No such order.
	#[error("order {0} not found")]
	OrderNotFound(Uuid),
	/// No such restaurant.
	#[error("restaurant {0} not found")]
	RestaurantNotFound(Uuid),
	/// No such menu item, or the item belongs to another restaurant.
	#[error("menu item {0} not found for this restaurant")]
	MenuItemNotFound(Uuid),
	/// The menu item exists but is not currently orderable.
	#[error("menu item {0} is unavailable")]
	MenuItemUnavailable(Uuid),
	/// The order request itself is malformed.
	#[error("invalid order request: {0}")]
	InvalidRequest(String),
	/// The requested edge does not exist in the transition table.
	#[error("invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The order is in a terminal state.
	#[error("order is already finalized in status {status}")]
	AlreadyFinalized { status: OrderStatus },
	/// Lost a concurrent claim race; the order went to someone else.
	#[error("order already claimed, current status {current_status}")]
	AlreadyClaimed { current_status: OrderStatus },
	/// Lost a concurrent compare-and-swap that was not a claim.
	#[error("order status changed concurrently, current status {current_status}")]
	Conflict { current_status: OrderStatus },
	/// Infrastructure failure in the backing store.
	#[error("storage failure: {0}")]
	Storage(String),
}

impl From<TransitionError> for OrderFlowError {
	fn from(err: TransitionError) -> Self {
		match err {
			TransitionError::AlreadyFinalized { status } => {
				OrderFlowError::AlreadyFinalized { status }
			}
			TransitionError::InvalidTransition { from, to } => {
				OrderFlowError::InvalidTransition { from, to }
			}
			TransitionError::RoleNotAllowed { role, .. } => OrderFlowError::Unauthorized { role },
			TransitionError::NotOwner => OrderFlowError::Forbidden,
			TransitionError::AssignedElsewhere { status } => OrderFlowError::AlreadyClaimed {
				current_status: status,
			},
		}
	}
}

impl From<StoreError> for OrderFlowError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::NotFound => OrderFlowError::Storage("entity disappeared".to_string()),
			StoreError::Conflict { actual } => OrderFlowError::Conflict {
				current_status: actual,
			},
			StoreError::Storage(msg) => OrderFlowError::Storage(msg),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stale_assignee_rejection_reports_the_live_status() {
		let err: OrderFlowError = TransitionError::AssignedElsewhere {
			status: OrderStatus::ReadyForPickup,
		}
		.into();
		match err {
			OrderFlowError::AlreadyClaimed { current_status } => {
				assert_eq!(current_status, OrderStatus::ReadyForPickup);
			}
			other => panic!("expected AlreadyClaimed, got {other:?}"),
		}
	}
}
