//! Storage-related types for the mealflow system.

/// Storage namespaces for the different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Namespace for order data.
	Orders,
	/// Namespace for restaurant data.
	Restaurants,
	/// Namespace for menu item data.
	MenuItems,
}

impl StorageKey {
	/// Returns the string representation of the storage namespace.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Restaurants => "restaurants",
			StorageKey::MenuItems => "menu_items",
		}
	}
}
