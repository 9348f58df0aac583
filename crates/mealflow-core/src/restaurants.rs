//! Restaurant and menu storage.

use std::sync::Arc;
use uuid::Uuid;

use mealflow_storage::StorageService;
use mealflow_types::{MenuItem, Restaurant, StorageKey};

use crate::store::StoreError;

/// Store for restaurants and their menus.
///
/// Menu items live in their own namespace keyed by item id and carry the
/// owning restaurant id, so a menu listing is a namespace scan filtered by
/// restaurant.
pub struct RestaurantStore {
	storage: Arc<StorageService>,
}

impl RestaurantStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn insert(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
		self.storage
			.store(
				StorageKey::Restaurants.as_str(),
				&restaurant.id.to_string(),
				restaurant,
			)
			.await?;
		Ok(())
	}

	pub async fn get(&self, id: Uuid) -> Result<Restaurant, StoreError> {
		let restaurant = self
			.storage
			.retrieve(StorageKey::Restaurants.as_str(), &id.to_string())
			.await?;
		Ok(restaurant)
	}

	/// Lists every restaurant, sorted by name for stable output.
	pub async fn list(&self) -> Result<Vec<Restaurant>, StoreError> {
		let mut restaurants: Vec<Restaurant> = self
			.storage
			.retrieve_all(StorageKey::Restaurants.as_str())
			.await?;
		restaurants.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(restaurants)
	}

	/// Lists restaurants owned by the given staff account.
	pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Restaurant>, StoreError> {
		let restaurants = self.list().await?;
		Ok(restaurants
			.into_iter()
			.filter(|r| r.owner_id == owner_id)
			.collect())
	}

	pub async fn insert_menu_item(&self, item: &MenuItem) -> Result<(), StoreError> {
		self.storage
			.store(StorageKey::MenuItems.as_str(), &item.id.to_string(), item)
			.await?;
		Ok(())
	}

	pub async fn get_menu_item(&self, id: Uuid) -> Result<MenuItem, StoreError> {
		let item = self
			.storage
			.retrieve(StorageKey::MenuItems.as_str(), &id.to_string())
			.await?;
		Ok(item)
	}

	/// Lists the menu of a restaurant, sorted by item name.
	pub async fn menu_for(&self, restaurant_id: Uuid) -> Result<Vec<MenuItem>, StoreError> {
		let items: Vec<MenuItem> = self
			.storage
			.retrieve_all(StorageKey::MenuItems.as_str())
			.await?;
		let mut items: Vec<MenuItem> = items
			.into_iter()
			.filter(|i| i.restaurant_id == restaurant_id)
			.collect();
		items.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(items)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use mealflow_storage::implementations::memory;
	use rust_decimal_macros::dec;

	fn store() -> RestaurantStore {
		let backend = memory::create_storage(&toml::Value::Table(Default::default()))
			.expect("memory backend");
		RestaurantStore::new(Arc::new(StorageService::new(backend)))
	}

	fn restaurant(name: &str, owner_id: Uuid) -> Restaurant {
		Restaurant {
			id: Uuid::new_v4(),
			owner_id,
			name: name.to_string(),
			address: "42 High St".to_string(),
			delivery_fee: dec!(2.99),
			created_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn owner_listing_only_returns_their_restaurants() {
		let store = store();
		let owner = Uuid::new_v4();
		store.insert(&restaurant("Bella Napoli", owner)).await.unwrap();
		store.insert(&restaurant("Aroma", owner)).await.unwrap();
		store
			.insert(&restaurant("Other Place", Uuid::new_v4()))
			.await
			.unwrap();

		let mine = store.list_by_owner(owner).await.unwrap();
		assert_eq!(mine.len(), 2);
		assert_eq!(mine[0].name, "Aroma", "sorted by name");
	}

	#[tokio::test]
	async fn menu_scan_is_scoped_to_the_restaurant() {
		let store = store();
		let r1 = restaurant("Bella Napoli", Uuid::new_v4());
		let r2 = restaurant("Aroma", Uuid::new_v4());
		store.insert(&r1).await.unwrap();
		store.insert(&r2).await.unwrap();

		let item = MenuItem {
			id: Uuid::new_v4(),
			restaurant_id: r1.id,
			name: "Margherita".to_string(),
			description: Some("Tomato, mozzarella, basil".to_string()),
			price: dec!(12.99),
			available: true,
		};
		store.insert_menu_item(&item).await.unwrap();

		assert_eq!(store.menu_for(r1.id).await.unwrap().len(), 1);
		assert!(store.menu_for(r2.id).await.unwrap().is_empty());
	}
}
