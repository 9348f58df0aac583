//! Persistent order store with compare-and-swap status updates.
//!
//! Every status change goes through [`OrderStore::cas_update_status`], which
//! re-reads the order under a per-order lock and only writes if the status
//! still matches what the caller validated against. A concurrent writer that
//! got there first surfaces as [`StoreError::Conflict`] carrying the status
//! actually found, never as a silent overwrite.

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use mealflow_storage::{StorageError, StorageService};
use mealflow_types::{Order, OrderStatus, StorageKey};

/// Errors that can occur in the order and restaurant stores.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The requested entity does not exist.
	#[error("entity not found")]
	NotFound,
	/// A compare-and-swap found a different status than expected.
	#[error("order status changed concurrently, found {actual}")]
	Conflict { actual: OrderStatus },
	/// The underlying storage backend failed.
	#[error("storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for StoreError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound => StoreError::NotFound,
			other => StoreError::Storage(other.to_string()),
		}
	}
}

/// Store for orders.
///
/// Listings scan the orders namespace and filter in memory; they are returned
/// newest first. The per-order lock table serializes writers of the same
/// order, which is what makes the compare step of the CAS trustworthy with
/// the bundled local backends.
pub struct OrderStore {
	storage: Arc<StorageService>,
	locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl OrderStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			locks: DashMap::new(),
		}
	}

	fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
		self.locks
			.entry(id)
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Persists a newly created order.
	pub async fn insert(&self, order: &Order) -> Result<(), StoreError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id.to_string(), order)
			.await?;
		Ok(())
	}

	/// Fetches a single order by id.
	pub async fn get(&self, id: Uuid) -> Result<Order, StoreError> {
		let order = self
			.storage
			.retrieve(StorageKey::Orders.as_str(), &id.to_string())
			.await?;
		Ok(order)
	}

	async fn scan(&self) -> Result<Vec<Order>, StoreError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Lists a customer's orders, newest first, optionally filtered by status.
	pub async fn list_by_customer(
		&self,
		customer_id: Uuid,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, StoreError> {
		let orders = self.scan().await?;
		Ok(orders
			.into_iter()
			.filter(|o| o.customer_id == customer_id)
			.filter(|o| status.map_or(true, |s| o.status == s))
			.collect())
	}

	/// Lists a restaurant's orders, newest first, optionally filtered by status.
	pub async fn list_by_restaurant(
		&self,
		restaurant_id: Uuid,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, StoreError> {
		let orders = self.scan().await?;
		Ok(orders
			.into_iter()
			.filter(|o| o.restaurant_id == restaurant_id)
			.filter(|o| status.map_or(true, |s| o.status == s))
			.collect())
	}

	/// Lists every order currently in the given status, newest first.
	pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
		let orders = self.scan().await?;
		Ok(orders.into_iter().filter(|o| o.status == status).collect())
	}

	/// Lists orders assigned to a delivery person, newest first.
	pub async fn list_assigned(
		&self,
		delivery_person_id: Uuid,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, StoreError> {
		let orders = self.scan().await?;
		Ok(orders
			.into_iter()
			.filter(|o| o.delivery_person_id == Some(delivery_person_id))
			.filter(|o| status.map_or(true, |s| o.status == s))
			.collect())
	}

	/// Lists every order, newest first.
	pub async fn list_all(
		&self,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, StoreError> {
		let orders = self.scan().await?;
		Ok(orders
			.into_iter()
			.filter(|o| status.map_or(true, |s| o.status == s))
			.collect())
	}

	/// Atomically applies a status mutation if the order is still in
	/// `expected`.
	///
	/// The mutator runs on a fresh copy of the order read under the lock, and
	/// must set the new status itself; `status_updated_at` is stamped here.
	/// Returns the updated order, or [`StoreError::Conflict`] with the status
	/// actually found when another writer committed first.
	pub async fn cas_update_status<F>(
		&self,
		id: Uuid,
		expected: OrderStatus,
		mutate: F,
	) -> Result<Order, StoreError>
	where
		F: FnOnce(&mut Order),
	{
		let lock = self.lock_for(id);
		let _guard = lock.lock().await;

		let mut order = self.get(id).await?;
		if order.status != expected {
			return Err(StoreError::Conflict {
				actual: order.status,
			});
		}

		mutate(&mut order);
		order.status_updated_at = chrono::Utc::now();

		self.storage
			.update(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await?;
		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use mealflow_storage::implementations::memory;
	use mealflow_types::{OrderTotals, PaymentMethod};
	use rust_decimal::Decimal;

	fn store() -> OrderStore {
		let backend = memory::create_storage(&toml::Value::Table(Default::default()))
			.expect("memory backend");
		OrderStore::new(Arc::new(StorageService::new(backend)))
	}

	fn sample_order(status: OrderStatus) -> Order {
		let now = Utc::now();
		Order {
			id: Uuid::new_v4(),
			customer_id: Uuid::new_v4(),
			restaurant_id: Uuid::new_v4(),
			delivery_person_id: None,
			items: vec![],
			status,
			delivery_address: "1 Main St".to_string(),
			special_instructions: None,
			phone_number: "555-0100".to_string(),
			payment_method: PaymentMethod::CashOnDelivery,
			totals: OrderTotals {
				subtotal: Decimal::ZERO,
				delivery_fee: Decimal::ZERO,
				tax: Decimal::ZERO,
				total: Decimal::ZERO,
			},
			created_at: now,
			status_updated_at: now,
		}
	}

	#[tokio::test]
	async fn insert_and_get_round_trip() {
		let store = store();
		let order = sample_order(OrderStatus::Pending);
		store.insert(&order).await.unwrap();

		let fetched = store.get(order.id).await.unwrap();
		assert_eq!(fetched.id, order.id);
		assert_eq!(fetched.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn cas_succeeds_when_status_matches() {
		let store = store();
		let order = sample_order(OrderStatus::Pending);
		store.insert(&order).await.unwrap();

		let updated = store
			.cas_update_status(order.id, OrderStatus::Pending, |o| {
				o.status = OrderStatus::Confirmed;
			})
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Confirmed);
		assert!(updated.status_updated_at >= order.status_updated_at);
	}

	#[tokio::test]
	async fn cas_reports_the_actual_status_on_conflict() {
		let store = store();
		let order = sample_order(OrderStatus::Confirmed);
		store.insert(&order).await.unwrap();

		let err = store
			.cas_update_status(order.id, OrderStatus::Pending, |o| {
				o.status = OrderStatus::Confirmed;
			})
			.await
			.unwrap_err();
		match err {
			StoreError::Conflict { actual } => assert_eq!(actual, OrderStatus::Confirmed),
			other => panic!("expected conflict, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn concurrent_cas_admits_exactly_one_writer() {
		let store = Arc::new(store());
		let order = sample_order(OrderStatus::ReadyForPickup);
		store.insert(&order).await.unwrap();

		let courier_a = Uuid::new_v4();
		let courier_b = Uuid::new_v4();

		let claim = |courier: Uuid| {
			let store = store.clone();
			let id = order.id;
			async move {
				store
					.cas_update_status(id, OrderStatus::ReadyForPickup, move |o| {
						o.status = OrderStatus::OutForDelivery;
						o.delivery_person_id = Some(courier);
					})
					.await
			}
		};

		let (a, b) = tokio::join!(claim(courier_a), claim(courier_b));
		assert!(a.is_ok() != b.is_ok(), "exactly one claim must win");

		let final_order = store.get(order.id).await.unwrap();
		assert_eq!(final_order.status, OrderStatus::OutForDelivery);
		let winner = if a.is_ok() { courier_a } else { courier_b };
		assert_eq!(final_order.delivery_person_id, Some(winner));
	}

	#[tokio::test]
	async fn listings_filter_and_sort() {
		let store = store();
		let customer = Uuid::new_v4();

		let mut first = sample_order(OrderStatus::Pending);
		first.customer_id = customer;
		first.created_at = Utc::now() - chrono::Duration::minutes(5);
		let mut second = sample_order(OrderStatus::Confirmed);
		second.customer_id = customer;

		store.insert(&first).await.unwrap();
		store.insert(&second).await.unwrap();
		store.insert(&sample_order(OrderStatus::Pending)).await.unwrap();

		let all = store.list_by_customer(customer, None).await.unwrap();
		assert_eq!(all.len(), 2);
		assert_eq!(all[0].id, second.id, "newest first");

		let pending = store
			.list_by_customer(customer, Some(OrderStatus::Pending))
			.await
			.unwrap();
		assert_eq!(pending.len(), 1);
		assert_eq!(pending[0].id, first.id);
	}
}
