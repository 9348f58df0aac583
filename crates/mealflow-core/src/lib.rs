//! Core order lifecycle engine for the mealflow platform.
//!
//! This crate owns the business rules: the table-driven transition validator,
//! pricing, the compare-and-swap order store, delivery claim coordination,
//! role-scoped queries and the lifecycle event bus. The HTTP layer in
//! `mealflow-service` is a thin shell over [`OrderFlow`].

pub mod assignment;
pub mod error;
pub mod events;
pub mod pricing;
pub mod restaurants;
pub mod service;
pub mod state;
pub mod store;

pub use assignment::AssignmentCoordinator;
pub use error::OrderFlowError;
pub use events::EventBus;
pub use pricing::price_order;
pub use restaurants::RestaurantStore;
pub use service::OrderFlow;
pub use state::{validate_transition, Transition, TransitionError};
pub use store::{OrderStore, StoreError};
