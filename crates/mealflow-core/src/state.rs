//! Order state transition rules.
//!
//! Orders move through a fixed lifecycle: Pending -> Confirmed -> Processing ->
//! ReadyForPickup -> OutForDelivery -> Completed, with Cancelled reachable from
//! every non-terminal state except OutForDelivery. Each edge is restricted to
//! specific roles, and role membership alone is not enough: customers may only
//! act on their own orders, restaurant staff only on orders of restaurants they
//! own, and delivery personnel only on orders they have claimed (or that are
//! still unclaimed, for the claim edge itself).

use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use mealflow_types::{AuthClaims, Order, OrderStatus, Role};

/// Errors produced while validating a requested status transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
	/// The order is in a terminal state and accepts no further transitions.
	#[error("order is already finalized in status {status}")]
	AlreadyFinalized { status: OrderStatus },
	/// No edge exists between the two states, for any role.
	#[error("invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The edge exists but is not available to the caller's role.
	#[error("role {role} may not move an order from {from} to {to}")]
	RoleNotAllowed {
		role: Role,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// The caller's role could perform this edge, but not on this order.
	#[error("caller does not own the resource required for this transition")]
	NotOwner,
	/// The claim edge was requested on an order already assigned to someone else.
	#[error("order is already assigned to another delivery person (status {status})")]
	AssignedElsewhere { status: OrderStatus },
}

/// A validated transition ready to be applied.
///
/// `assign_to` is set exactly when the edge is the delivery claim
/// (ReadyForPickup -> OutForDelivery), in which case the claiming courier
/// must be recorded on the order in the same write as the status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub to: OrderStatus,
	pub assign_to: Option<Uuid>,
}

// Static edge table - each (from, to) pair maps to the roles allowed to
// perform it. Ownership conditions are checked separately per role.
static EDGES: Lazy<HashMap<(OrderStatus, OrderStatus), &'static [Role]>> = Lazy::new(|| {
	use OrderStatus::*;
	use Role::*;

	let mut m: HashMap<(OrderStatus, OrderStatus), &'static [Role]> = HashMap::new();
	m.insert((Pending, Confirmed), &[RestaurantStaff]);
	m.insert((Pending, Cancelled), &[Customer, RestaurantStaff]);
	m.insert((Confirmed, Processing), &[RestaurantStaff]);
	m.insert((Confirmed, Cancelled), &[Customer, RestaurantStaff]);
	m.insert((Processing, ReadyForPickup), &[RestaurantStaff]);
	m.insert((Processing, Cancelled), &[RestaurantStaff]);
	m.insert((ReadyForPickup, OutForDelivery), &[DeliveryPersonnel]);
	m.insert((ReadyForPickup, Cancelled), &[RestaurantStaff]);
	m.insert((OutForDelivery, Completed), &[DeliveryPersonnel]);
	m
});

/// Validates that `actor` may move `order` to `requested`.
///
/// `restaurant_owner` is the owner of the restaurant the order belongs to;
/// it is needed to evaluate the staff ownership condition. The check is pure:
/// it reads the order but never mutates it, so callers can re-check against
/// fresh state before committing.
pub fn validate_transition(
	order: &Order,
	requested: OrderStatus,
	actor: &AuthClaims,
	restaurant_owner: Uuid,
) -> Result<Transition, TransitionError> {
	if order.is_finalized() {
		return Err(TransitionError::AlreadyFinalized {
			status: order.status,
		});
	}

	let roles = EDGES
		.get(&(order.status, requested))
		.ok_or(TransitionError::InvalidTransition {
			from: order.status,
			to: requested,
		})?;

	if !roles.contains(&actor.role) {
		return Err(TransitionError::RoleNotAllowed {
			role: actor.role,
			from: order.status,
			to: requested,
		});
	}

	match actor.role {
		Role::Customer => {
			if order.customer_id != actor.actor_id {
				return Err(TransitionError::NotOwner);
			}
			Ok(Transition {
				to: requested,
				assign_to: None,
			})
		}
		Role::RestaurantStaff => {
			if restaurant_owner != actor.actor_id {
				return Err(TransitionError::NotOwner);
			}
			Ok(Transition {
				to: requested,
				assign_to: None,
			})
		}
		Role::DeliveryPersonnel => {
			if order.status == OrderStatus::ReadyForPickup {
				// Claim edge: the order must still be unassigned, or already
				// assigned to this same courier (idempotent re-claim is rejected
				// later by the status compare, not here).
				match order.delivery_person_id {
					Some(assigned) if assigned != actor.actor_id => {
						Err(TransitionError::AssignedElsewhere {
							status: order.status,
						})
					}
					_ => Ok(Transition {
						to: requested,
						assign_to: Some(actor.actor_id),
					}),
				}
			} else {
				// Completion edge: only the assigned courier may finish.
				if order.delivery_person_id != Some(actor.actor_id) {
					return Err(TransitionError::NotOwner);
				}
				Ok(Transition {
					to: requested,
					assign_to: None,
				})
			}
		}
		Role::Admin => Err(TransitionError::RoleNotAllowed {
			role: actor.role,
			from: order.status,
			to: requested,
		}),
	}
}
