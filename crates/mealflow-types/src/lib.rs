//! Common types module for the mealflow order system.
//!
//! This module defines the core data types and structures shared by all
//! mealflow components. It provides a centralized location for shared types
//! to ensure consistency across the storage, core and service crates.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Actor identity and role types used for authorization.
pub mod auth;
/// Event types for intra-service lifecycle notifications.
pub mod events;
/// Order, order item and order status types.
pub mod order;
/// Restaurant and menu item types.
pub mod restaurant;
/// Storage namespace keys for persistent data.
pub mod storage;
/// Configuration validation types for storage backend configs.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use auth::*;
pub use events::*;
pub use order::*;
pub use restaurant::*;
pub use storage::*;
pub use validation::*;
