//! Order flow service.
//!
//! This is the role-aware facade the HTTP layer talks to. It owns the order
//! and restaurant stores, runs every mutation through the transition
//! validator and the store's compare-and-swap, scopes every read to the
//! caller's role, and publishes lifecycle events on the bus.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use mealflow_types::{
	AuthClaims, CreateMenuItemRequest, CreateOrderRequest, CreateRestaurantRequest,
	DeliveryDashboard, MenuItem, Order, OrderEvent, OrderItem, OrderStatus, RecentDelivery,
	Restaurant, Role,
};

use crate::assignment::AssignmentCoordinator;
use crate::error::OrderFlowError;
use crate::events::EventBus;
use crate::pricing::price_order;
use crate::restaurants::RestaurantStore;
use crate::state::validate_transition;
use crate::store::{OrderStore, StoreError};

/// Role-aware order lifecycle service.
pub struct OrderFlow {
	orders: Arc<OrderStore>,
	restaurants: Arc<RestaurantStore>,
	assignment: AssignmentCoordinator,
	events: EventBus,
	tax_rate: Decimal,
}

impl OrderFlow {
	pub fn new(
		orders: Arc<OrderStore>,
		restaurants: Arc<RestaurantStore>,
		events: EventBus,
		tax_rate: Decimal,
	) -> Self {
		let assignment = AssignmentCoordinator::new(orders.clone());
		Self {
			orders,
			restaurants,
			assignment,
			events,
			tax_rate,
		}
	}

	/// Access to the event bus, for subscribers.
	pub fn events(&self) -> &EventBus {
		&self.events
	}

	async fn fetch_order(&self, id: Uuid) -> Result<Order, OrderFlowError> {
		match self.orders.get(id).await {
			Ok(order) => Ok(order),
			Err(StoreError::NotFound) => Err(OrderFlowError::OrderNotFound(id)),
			Err(e) => Err(e.into()),
		}
	}

	async fn fetch_restaurant(&self, id: Uuid) -> Result<Restaurant, OrderFlowError> {
		match self.restaurants.get(id).await {
			Ok(restaurant) => Ok(restaurant),
			Err(StoreError::NotFound) => Err(OrderFlowError::RestaurantNotFound(id)),
			Err(e) => Err(e.into()),
		}
	}

	// ---- orders ----

	/// Creates an order from a customer checkout.
	///
	/// Prices are resolved from the menu server-side and totals are computed
	/// once here; the stored breakdown never changes afterwards.
	pub async fn create_order(
		&self,
		claims: &AuthClaims,
		request: CreateOrderRequest,
	) -> Result<Order, OrderFlowError> {
		if claims.role != Role::Customer {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		if request.items.is_empty() {
			return Err(OrderFlowError::InvalidRequest(
				"order must contain at least one item".to_string(),
			));
		}
		if request.delivery_address.trim().is_empty() {
			return Err(OrderFlowError::InvalidRequest(
				"deliveryAddress is required".to_string(),
			));
		}
		let phone_number = request
			.phone_number
			.filter(|p| !p.trim().is_empty())
			.ok_or_else(|| {
				OrderFlowError::InvalidRequest("phoneNumber is required".to_string())
			})?;

		let restaurant = self.fetch_restaurant(request.restaurant_id).await?;

		let mut items = Vec::with_capacity(request.items.len());
		for line in &request.items {
			if line.quantity == 0 {
				return Err(OrderFlowError::InvalidRequest(format!(
					"quantity for item {} must be at least 1",
					line.menu_item_id
				)));
			}
			let menu_item = match self.restaurants.get_menu_item(line.menu_item_id).await {
				Ok(item) => item,
				Err(StoreError::NotFound) => {
					return Err(OrderFlowError::MenuItemNotFound(line.menu_item_id))
				}
				Err(e) => return Err(e.into()),
			};
			if menu_item.restaurant_id != restaurant.id {
				return Err(OrderFlowError::MenuItemNotFound(line.menu_item_id));
			}
			if !menu_item.available {
				return Err(OrderFlowError::MenuItemUnavailable(line.menu_item_id));
			}
			items.push(OrderItem {
				menu_item_id: menu_item.id,
				name: menu_item.name,
				quantity: line.quantity,
				unit_price: menu_item.price,
				special_instructions: line.special_instructions.clone(),
			});
		}

		let totals = price_order(&items, restaurant.delivery_fee, self.tax_rate);
		let now = Utc::now();
		let order = Order {
			id: Uuid::new_v4(),
			customer_id: claims.actor_id,
			restaurant_id: restaurant.id,
			delivery_person_id: None,
			items,
			status: OrderStatus::Pending,
			delivery_address: request.delivery_address,
			special_instructions: request.special_instructions,
			phone_number,
			payment_method: request.payment_method,
			totals,
			created_at: now,
			status_updated_at: now,
		};

		self.orders.insert(&order).await?;
		tracing::info!(order_id = %order.id, restaurant_id = %order.restaurant_id, "order placed");
		self.events.publish(OrderEvent::Placed {
			order: order.clone(),
		});
		Ok(order)
	}

	fn can_view(&self, claims: &AuthClaims, order: &Order, restaurant_owner: Uuid) -> bool {
		match claims.role {
			Role::Admin => true,
			Role::Customer => order.customer_id == claims.actor_id,
			Role::RestaurantStaff => restaurant_owner == claims.actor_id,
			Role::DeliveryPersonnel => {
				order.delivery_person_id == Some(claims.actor_id)
					|| (order.status == OrderStatus::ReadyForPickup
						&& order.delivery_person_id.is_none())
			}
		}
	}

	/// Fetches one order, enforcing role-scoped visibility.
	pub async fn get_order(
		&self,
		claims: &AuthClaims,
		order_id: Uuid,
	) -> Result<Order, OrderFlowError> {
		let order = self.fetch_order(order_id).await?;
		let restaurant = self.fetch_restaurant(order.restaurant_id).await?;
		if !self.can_view(claims, &order, restaurant.owner_id) {
			return Err(OrderFlowError::Forbidden);
		}
		Ok(order)
	}

	/// Lists orders visible to the caller, optionally filtered by status.
	pub async fn list_orders(
		&self,
		claims: &AuthClaims,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, OrderFlowError> {
		let orders = match claims.role {
			Role::Customer => self.orders.list_by_customer(claims.actor_id, status).await?,
			Role::DeliveryPersonnel => self.orders.list_assigned(claims.actor_id, status).await?,
			Role::RestaurantStaff => {
				let mut out = Vec::new();
				for restaurant in self.restaurants.list_by_owner(claims.actor_id).await? {
					out.extend(self.orders.list_by_restaurant(restaurant.id, status).await?);
				}
				out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
				out
			}
			Role::Admin => self.orders.list_all(status).await?,
		};
		Ok(orders)
	}

	/// Lists a restaurant's orders for its owner (or an admin).
	pub async fn restaurant_orders(
		&self,
		claims: &AuthClaims,
		restaurant_id: Uuid,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, OrderFlowError> {
		let restaurant = self.fetch_restaurant(restaurant_id).await?;
		if claims.role != Role::Admin
			&& !(claims.role == Role::RestaurantStaff && restaurant.owner_id == claims.actor_id)
		{
			return Err(OrderFlowError::Forbidden);
		}
		let orders = self.orders.list_by_restaurant(restaurant_id, status).await?;
		Ok(orders)
	}

	/// Applies a status transition on behalf of `claims`.
	///
	/// The transition is validated against a snapshot, then committed with a
	/// compare-and-swap against the snapshot's status; a concurrent writer
	/// surfaces as a conflict carrying the status actually found.
	pub async fn update_status(
		&self,
		claims: &AuthClaims,
		order_id: Uuid,
		requested: OrderStatus,
	) -> Result<Order, OrderFlowError> {
		let order = self.fetch_order(order_id).await?;
		let restaurant = self.fetch_restaurant(order.restaurant_id).await?;
		let transition = validate_transition(&order, requested, claims, restaurant.owner_id)?;

		let from = order.status;
		let result = self
			.orders
			.cas_update_status(order_id, from, |o| {
				o.status = transition.to;
				if let Some(courier) = transition.assign_to {
					o.delivery_person_id = Some(courier);
				}
			})
			.await;

		let updated = match result {
			Ok(updated) => updated,
			Err(StoreError::Conflict { actual }) if requested == OrderStatus::OutForDelivery => {
				return Err(OrderFlowError::AlreadyClaimed {
					current_status: actual,
				})
			}
			Err(e) => return Err(e.into()),
		};

		tracing::info!(
			order_id = %order_id,
			from = %from,
			to = %updated.status,
			role = %claims.role,
			"order status changed"
		);
		self.events.publish(OrderEvent::StatusChanged {
			order_id,
			from,
			to: updated.status,
			actor: *claims,
		});
		if let Some(courier) = transition.assign_to {
			self.events.publish(OrderEvent::Claimed {
				order_id,
				delivery_person_id: courier,
			});
		}
		if updated.status == OrderStatus::Cancelled {
			self.events.publish(OrderEvent::Cancelled {
				order_id,
				actor: *claims,
			});
		}
		Ok(updated)
	}

	/// Staff-driven transition scoped to a restaurant path.
	///
	/// An order that exists but belongs to a different restaurant is reported
	/// as not found rather than leaking its existence.
	pub async fn restaurant_update_status(
		&self,
		claims: &AuthClaims,
		restaurant_id: Uuid,
		order_id: Uuid,
		requested: OrderStatus,
	) -> Result<Order, OrderFlowError> {
		let order = self.fetch_order(order_id).await?;
		if order.restaurant_id != restaurant_id {
			return Err(OrderFlowError::OrderNotFound(order_id));
		}
		self.update_status(claims, order_id, requested).await
	}

	/// Customer or staff cancellation.
	pub async fn cancel_order(
		&self,
		claims: &AuthClaims,
		order_id: Uuid,
	) -> Result<Order, OrderFlowError> {
		self.update_status(claims, order_id, OrderStatus::Cancelled)
			.await
	}

	// ---- delivery ----

	/// Claims an order for the calling courier.
	pub async fn accept_order(
		&self,
		claims: &AuthClaims,
		order_id: Uuid,
	) -> Result<Order, OrderFlowError> {
		if claims.role != Role::DeliveryPersonnel {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		let order = self.assignment.claim(order_id, claims.actor_id).await?;

		tracing::info!(order_id = %order_id, courier = %claims.actor_id, "order claimed");
		self.events.publish(OrderEvent::StatusChanged {
			order_id,
			from: OrderStatus::ReadyForPickup,
			to: OrderStatus::OutForDelivery,
			actor: *claims,
		});
		self.events.publish(OrderEvent::Claimed {
			order_id,
			delivery_person_id: claims.actor_id,
		});
		Ok(order)
	}

	/// The pool of unclaimed orders ready for pickup.
	pub async fn available_for_delivery(
		&self,
		claims: &AuthClaims,
	) -> Result<Vec<Order>, OrderFlowError> {
		if !matches!(claims.role, Role::DeliveryPersonnel | Role::Admin) {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		let orders = self
			.orders
			.list_by_status(OrderStatus::ReadyForPickup)
			.await?;
		Ok(orders
			.into_iter()
			.filter(|o| o.delivery_person_id.is_none())
			.collect())
	}

	/// The calling courier's in-flight deliveries.
	pub async fn active_deliveries(
		&self,
		claims: &AuthClaims,
	) -> Result<Vec<Order>, OrderFlowError> {
		if claims.role != Role::DeliveryPersonnel {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		let orders = self
			.orders
			.list_assigned(claims.actor_id, Some(OrderStatus::OutForDelivery))
			.await?;
		Ok(orders)
	}

	/// Summary view for the courier's dashboard.
	///
	/// "Today" is judged by the completion timestamp (`status_updated_at`),
	/// not by when the order was placed.
	pub async fn dashboard(
		&self,
		claims: &AuthClaims,
	) -> Result<DeliveryDashboard, OrderFlowError> {
		if claims.role != Role::DeliveryPersonnel {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}

		let assigned = self.orders.list_assigned(claims.actor_id, None).await?;
		let active_delivery = assigned
			.iter()
			.find(|o| o.status == OrderStatus::OutForDelivery)
			.cloned();

		let today = Utc::now().date_naive();
		let mut completed_today: Vec<&Order> = assigned
			.iter()
			.filter(|o| {
				o.status == OrderStatus::Completed && o.status_updated_at.date_naive() == today
			})
			.collect();
		completed_today.sort_by(|a, b| b.status_updated_at.cmp(&a.status_updated_at));

		let total_earnings_today: Decimal =
			completed_today.iter().map(|o| o.totals.total).sum();

		let mut recent_deliveries = Vec::new();
		for order in completed_today.iter().take(5) {
			let restaurant_name = self
				.restaurants
				.get(order.restaurant_id)
				.await
				.map(|r| r.name)
				.unwrap_or_else(|_| "Unknown".to_string());
			recent_deliveries.push(RecentDelivery {
				order_id: order.id,
				restaurant_name,
				completed_at: order.status_updated_at,
				total: order.totals.total,
			});
		}

		let available = self.available_for_delivery(claims).await?;

		Ok(DeliveryDashboard {
			active_delivery,
			completed_today: completed_today.len() as u64,
			total_earnings_today,
			available_orders: available.len() as u64,
			recent_deliveries,
		})
	}

	// ---- restaurants ----

	/// Registers a restaurant owned by the calling staff account.
	pub async fn create_restaurant(
		&self,
		claims: &AuthClaims,
		request: CreateRestaurantRequest,
	) -> Result<Restaurant, OrderFlowError> {
		if claims.role != Role::RestaurantStaff {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		if request.name.trim().is_empty() {
			return Err(OrderFlowError::InvalidRequest(
				"name is required".to_string(),
			));
		}
		if request.delivery_fee < Decimal::ZERO {
			return Err(OrderFlowError::InvalidRequest(
				"deliveryFee must not be negative".to_string(),
			));
		}

		let restaurant = Restaurant {
			id: Uuid::new_v4(),
			owner_id: claims.actor_id,
			name: request.name,
			address: request.address,
			delivery_fee: request.delivery_fee,
			created_at: Utc::now(),
		};
		self.restaurants.insert(&restaurant).await?;
		tracing::info!(restaurant_id = %restaurant.id, "restaurant registered");
		Ok(restaurant)
	}

	/// Public listing of every restaurant.
	pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, OrderFlowError> {
		let restaurants = self.restaurants.list().await?;
		Ok(restaurants)
	}

	/// Public view of a single restaurant.
	pub async fn get_restaurant(&self, id: Uuid) -> Result<Restaurant, OrderFlowError> {
		self.fetch_restaurant(id).await
	}

	/// Adds a menu item; only the restaurant's owner may do this.
	pub async fn add_menu_item(
		&self,
		claims: &AuthClaims,
		restaurant_id: Uuid,
		request: CreateMenuItemRequest,
	) -> Result<MenuItem, OrderFlowError> {
		if claims.role != Role::RestaurantStaff {
			return Err(OrderFlowError::Unauthorized { role: claims.role });
		}
		let restaurant = self.fetch_restaurant(restaurant_id).await?;
		if restaurant.owner_id != claims.actor_id {
			return Err(OrderFlowError::Forbidden);
		}
		if request.price <= Decimal::ZERO {
			return Err(OrderFlowError::InvalidRequest(
				"price must be positive".to_string(),
			));
		}

		let item = MenuItem {
			id: Uuid::new_v4(),
			restaurant_id,
			name: request.name,
			description: request.description,
			price: request.price,
			available: request.available,
		};
		self.restaurants.insert_menu_item(&item).await?;
		Ok(item)
	}

	/// Public menu listing for a restaurant.
	pub async fn menu(&self, restaurant_id: Uuid) -> Result<Vec<MenuItem>, OrderFlowError> {
		self.fetch_restaurant(restaurant_id).await?;
		let items = self.restaurants.menu_for(restaurant_id).await?;
		Ok(items)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use mealflow_storage::{implementations::memory, StorageService};
	use mealflow_types::{OrderItemRequest, PaymentMethod};
	use rust_decimal_macros::dec;

	struct World {
		flow: OrderFlow,
		customer: AuthClaims,
		staff: AuthClaims,
		courier_a: AuthClaims,
		courier_b: AuthClaims,
		restaurant: Restaurant,
		pizza: MenuItem,
	}

	async fn world() -> World {
		let backend = memory::create_storage(&toml::Value::Table(Default::default()))
			.expect("memory backend");
		let storage = Arc::new(StorageService::new(backend));
		let flow = OrderFlow::new(
			Arc::new(OrderStore::new(storage.clone())),
			Arc::new(RestaurantStore::new(storage)),
			EventBus::default(),
			dec!(0.08),
		);

		let customer = AuthClaims::new(Uuid::new_v4(), Role::Customer);
		let staff = AuthClaims::new(Uuid::new_v4(), Role::RestaurantStaff);
		let courier_a = AuthClaims::new(Uuid::new_v4(), Role::DeliveryPersonnel);
		let courier_b = AuthClaims::new(Uuid::new_v4(), Role::DeliveryPersonnel);

		let restaurant = flow
			.create_restaurant(
				&staff,
				CreateRestaurantRequest {
					name: "Bella Napoli".to_string(),
					address: "42 High St".to_string(),
					delivery_fee: dec!(2.99),
				},
			)
			.await
			.unwrap();
		let pizza = flow
			.add_menu_item(
				&staff,
				restaurant.id,
				CreateMenuItemRequest {
					name: "Margherita".to_string(),
					description: None,
					price: dec!(12.99),
					available: true,
				},
			)
			.await
			.unwrap();

		World {
			flow,
			customer,
			staff,
			courier_a,
			courier_b,
			restaurant,
			pizza,
		}
	}

	fn checkout(w: &World, quantity: u32) -> CreateOrderRequest {
		CreateOrderRequest {
			restaurant_id: w.restaurant.id,
			items: vec![OrderItemRequest {
				menu_item_id: w.pizza.id,
				quantity,
				special_instructions: None,
			}],
			delivery_address: "1 Main St".to_string(),
			special_instructions: None,
			phone_number: Some("555-0100".to_string()),
			payment_method: PaymentMethod::CreditCard,
		}
	}

	#[tokio::test]
	async fn checkout_prices_from_the_menu() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 2)).await.unwrap();

		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.totals.subtotal, dec!(25.98));
		assert_eq!(order.totals.delivery_fee, dec!(2.99));
		assert_eq!(order.totals.tax, dec!(2.08));
		assert_eq!(order.totals.total, dec!(31.05));
		assert_eq!(order.items[0].unit_price, dec!(12.99));
		assert_eq!(order.phone_number, "555-0100");
	}

	#[tokio::test]
	async fn only_customers_create_orders() {
		let w = world().await;
		let err = w.flow.create_order(&w.staff, checkout(&w, 1)).await.unwrap_err();
		assert!(matches!(err, OrderFlowError::Unauthorized { .. }));
	}

	#[tokio::test]
	async fn unavailable_items_are_rejected() {
		let w = world().await;
		let sold_out = w
			.flow
			.add_menu_item(
				&w.staff,
				w.restaurant.id,
				CreateMenuItemRequest {
					name: "Calzone".to_string(),
					description: None,
					price: dec!(9.99),
					available: false,
				},
			)
			.await
			.unwrap();

		let mut request = checkout(&w, 1);
		request.items[0].menu_item_id = sold_out.id;
		let err = w.flow.create_order(&w.customer, request).await.unwrap_err();
		assert!(matches!(err, OrderFlowError::MenuItemUnavailable(id) if id == sold_out.id));
	}

	#[tokio::test]
	async fn full_lifecycle_with_claim_race() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 2)).await.unwrap();

		let order = w
			.flow
			.update_status(&w.staff, order.id, OrderStatus::Confirmed)
			.await
			.unwrap();
		let order = w
			.flow
			.update_status(&w.staff, order.id, OrderStatus::Processing)
			.await
			.unwrap();
		let order = w
			.flow
			.update_status(&w.staff, order.id, OrderStatus::ReadyForPickup)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::ReadyForPickup);

		let claimed = w.flow.accept_order(&w.courier_a, order.id).await.unwrap();
		assert_eq!(claimed.status, OrderStatus::OutForDelivery);
		assert_eq!(claimed.delivery_person_id, Some(w.courier_a.actor_id));

		let err = w.flow.accept_order(&w.courier_b, order.id).await.unwrap_err();
		match err {
			OrderFlowError::AlreadyClaimed { current_status } => {
				assert_eq!(current_status, OrderStatus::OutForDelivery);
			}
			other => panic!("expected AlreadyClaimed, got {other:?}"),
		}

		let done = w
			.flow
			.update_status(&w.courier_a, order.id, OrderStatus::Completed)
			.await
			.unwrap();
		assert_eq!(done.status, OrderStatus::Completed);
		assert_eq!(done.delivery_person_id, Some(w.courier_a.actor_id));

		// Finalized orders accept nothing further, from anyone.
		let err = w
			.flow
			.update_status(&w.staff, order.id, OrderStatus::Cancelled)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			OrderFlowError::AlreadyFinalized {
				status: OrderStatus::Completed
			}
		));
	}

	#[tokio::test]
	async fn customer_cannot_cancel_out_for_delivery() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();
		for status in [
			OrderStatus::Confirmed,
			OrderStatus::Processing,
			OrderStatus::ReadyForPickup,
		] {
			w.flow.update_status(&w.staff, order.id, status).await.unwrap();
		}
		w.flow.accept_order(&w.courier_a, order.id).await.unwrap();

		let err = w.flow.cancel_order(&w.customer, order.id).await.unwrap_err();
		assert!(matches!(
			err,
			OrderFlowError::InvalidTransition {
				from: OrderStatus::OutForDelivery,
				to: OrderStatus::Cancelled,
			}
		));
	}

	#[tokio::test]
	async fn customer_cancels_own_pending_order() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();
		let cancelled = w.flow.cancel_order(&w.customer, order.id).await.unwrap();
		assert_eq!(cancelled.status, OrderStatus::Cancelled);
	}

	#[tokio::test]
	async fn visibility_is_role_scoped() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();

		// Owner, staff of the restaurant, and admin can see it.
		w.flow.get_order(&w.customer, order.id).await.unwrap();
		w.flow.get_order(&w.staff, order.id).await.unwrap();
		let admin = AuthClaims::new(Uuid::new_v4(), Role::Admin);
		w.flow.get_order(&admin, order.id).await.unwrap();

		// Another customer cannot.
		let stranger = AuthClaims::new(Uuid::new_v4(), Role::Customer);
		let err = w.flow.get_order(&stranger, order.id).await.unwrap_err();
		assert!(matches!(err, OrderFlowError::Forbidden));

		// A courier only sees it once it is claimable or theirs.
		let err = w.flow.get_order(&w.courier_a, order.id).await.unwrap_err();
		assert!(matches!(err, OrderFlowError::Forbidden));
		for status in [
			OrderStatus::Confirmed,
			OrderStatus::Processing,
			OrderStatus::ReadyForPickup,
		] {
			w.flow.update_status(&w.staff, order.id, status).await.unwrap();
		}
		w.flow.get_order(&w.courier_a, order.id).await.unwrap();
	}

	#[tokio::test]
	async fn available_pool_excludes_claimed_orders() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();
		for status in [
			OrderStatus::Confirmed,
			OrderStatus::Processing,
			OrderStatus::ReadyForPickup,
		] {
			w.flow.update_status(&w.staff, order.id, status).await.unwrap();
		}

		let pool = w.flow.available_for_delivery(&w.courier_a).await.unwrap();
		assert_eq!(pool.len(), 1);

		w.flow.accept_order(&w.courier_a, order.id).await.unwrap();
		let pool = w.flow.available_for_delivery(&w.courier_b).await.unwrap();
		assert!(pool.is_empty());

		let active = w.flow.active_deliveries(&w.courier_a).await.unwrap();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].id, order.id);
	}

	#[tokio::test]
	async fn dashboard_reflects_todays_completions() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 2)).await.unwrap();
		for status in [
			OrderStatus::Confirmed,
			OrderStatus::Processing,
			OrderStatus::ReadyForPickup,
		] {
			w.flow.update_status(&w.staff, order.id, status).await.unwrap();
		}
		w.flow.accept_order(&w.courier_a, order.id).await.unwrap();
		w.flow
			.update_status(&w.courier_a, order.id, OrderStatus::Completed)
			.await
			.unwrap();

		let dashboard = w.flow.dashboard(&w.courier_a).await.unwrap();
		assert!(dashboard.active_delivery.is_none());
		assert_eq!(dashboard.completed_today, 1);
		assert_eq!(dashboard.total_earnings_today, dec!(31.05));
		assert_eq!(dashboard.available_orders, 0);
		assert_eq!(dashboard.recent_deliveries.len(), 1);
		assert_eq!(dashboard.recent_deliveries[0].restaurant_name, "Bella Napoli");

		// Another courier's dashboard is empty.
		let other = w.flow.dashboard(&w.courier_b).await.unwrap();
		assert_eq!(other.completed_today, 0);
		assert_eq!(other.total_earnings_today, Decimal::ZERO);
	}

	#[tokio::test]
	async fn restaurant_scoped_update_hides_foreign_orders() {
		let w = world().await;
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();

		let other_staff = AuthClaims::new(Uuid::new_v4(), Role::RestaurantStaff);
		let other_restaurant = w
			.flow
			.create_restaurant(
				&other_staff,
				CreateRestaurantRequest {
					name: "Aroma".to_string(),
					address: "9 Side St".to_string(),
					delivery_fee: dec!(1.50),
				},
			)
			.await
			.unwrap();

		let err = w
			.flow
			.restaurant_update_status(
				&other_staff,
				other_restaurant.id,
				order.id,
				OrderStatus::Confirmed,
			)
			.await
			.unwrap_err();
		assert!(matches!(err, OrderFlowError::OrderNotFound(_)));
	}

	#[tokio::test]
	async fn status_changes_publish_events() {
		let w = world().await;
		let mut rx = w.flow.events().subscribe();
		let order = w.flow.create_order(&w.customer, checkout(&w, 1)).await.unwrap();
		w.flow
			.update_status(&w.staff, order.id, OrderStatus::Confirmed)
			.await
			.unwrap();

		match rx.recv().await.unwrap() {
			OrderEvent::Placed { order: placed } => assert_eq!(placed.id, order.id),
			other => panic!("expected Placed, got {other:?}"),
		}
		match rx.recv().await.unwrap() {
			OrderEvent::StatusChanged { from, to, .. } => {
				assert_eq!(from, OrderStatus::Pending);
				assert_eq!(to, OrderStatus::Confirmed);
			}
			other => panic!("expected StatusChanged, got {other:?}"),
		}
	}
}
