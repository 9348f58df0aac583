//! HTTP server for the mealflow API.
//!
//! A thin shell over [`OrderFlow`]: handlers extract verified claims, parse
//! the request, call the service and map [`OrderFlowError`] onto the API
//! error taxonomy. No business rule lives here.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Json},
	routing::{get, post, put},
	Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use mealflow_config::ServerConfig;
use mealflow_core::{OrderFlow, OrderFlowError};
use mealflow_types::{
	ApiError, CreateMenuItemRequest, CreateOrderRequest, CreateRestaurantRequest, OrderStatus,
	StatusUpdateRequest,
};

use crate::auth::Authenticated;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// The order lifecycle service behind every handler.
	pub flow: Arc<OrderFlow>,
	/// Secret used to verify bearer credentials.
	pub shared_secret: String,
}

/// Maps service errors onto the wire taxonomy.
fn map_err(err: OrderFlowError) -> ApiError {
	match err {
		OrderFlowError::Unauthorized { role } => ApiError::Unauthorized {
			message: format!("role {} may not perform this operation", role),
		},
		OrderFlowError::Forbidden => ApiError::Forbidden {
			message: "you do not own this resource".to_string(),
		},
		OrderFlowError::OrderNotFound(id) => ApiError::NotFound {
			message: format!("order {} not found", id),
		},
		OrderFlowError::RestaurantNotFound(id) => ApiError::NotFound {
			message: format!("restaurant {} not found", id),
		},
		OrderFlowError::MenuItemNotFound(id) => ApiError::NotFound {
			message: format!("menu item {} not found", id),
		},
		OrderFlowError::MenuItemUnavailable(id) => ApiError::BadRequest {
			error_type: "ITEM_UNAVAILABLE".to_string(),
			message: format!("menu item {} is unavailable", id),
		},
		OrderFlowError::InvalidRequest(message) => ApiError::BadRequest {
			error_type: "INVALID_REQUEST".to_string(),
			message,
		},
		OrderFlowError::InvalidTransition { from, to } => ApiError::Conflict {
			error_type: "INVALID_TRANSITION".to_string(),
			message: format!("no transition from {} to {}", from, to),
			current_status: Some(from),
		},
		OrderFlowError::AlreadyFinalized { status } => ApiError::Conflict {
			error_type: "ORDER_ALREADY_FINALIZED".to_string(),
			message: format!("order is already finalized in status {}", status),
			current_status: Some(status),
		},
		OrderFlowError::AlreadyClaimed { current_status } => ApiError::Conflict {
			error_type: "ALREADY_CLAIMED".to_string(),
			message: "order has already been claimed".to_string(),
			current_status: Some(current_status),
		},
		OrderFlowError::Conflict { current_status } => ApiError::Conflict {
			error_type: "CONFLICT".to_string(),
			message: "order was updated concurrently".to_string(),
			current_status: Some(current_status),
		},
		OrderFlowError::Storage(message) => {
			tracing::error!("storage failure: {}", message);
			ApiError::Internal {
				message: "internal storage failure".to_string(),
			}
		}
	}
}

/// Query parameters shared by the listing endpoints.
#[derive(Debug, Deserialize)]
struct ListQuery {
	status: Option<OrderStatus>,
}

/// Starts the HTTP server and runs until shutdown is requested.
pub async fn start_server(
	server_config: ServerConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", server_config.host, server_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("mealflow API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			tracing::info!("shutdown signal received");
		})
		.await?;

	Ok(())
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(create_order).get(list_orders))
				.route("/orders/{id}", get(get_order))
				.route("/orders/{id}/cancel", put(cancel_order))
				.route("/restaurants", post(create_restaurant))
				.route("/restaurants/{id}/orders", get(restaurant_orders))
				.route(
					"/restaurants/{id}/orders/{order_id}/status",
					put(restaurant_update_status),
				)
				.route("/restaurants/{id}/menu", post(add_menu_item))
				.route("/delivery/available-orders", get(available_orders))
				.route("/delivery/active-orders", get(active_deliveries))
				.route("/delivery/dashboard", get(dashboard))
				.route("/delivery/orders/{id}", get(get_order))
				.route("/delivery/orders/{id}/accept", post(accept_order))
				.route("/delivery/orders/{id}/status", put(delivery_update_status))
				.route("/public/restaurants", get(list_restaurants))
				.route("/public/restaurants/{id}", get(get_restaurant))
				.route("/public/restaurants/{id}/menu", get(menu)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

// ---- order handlers ----

async fn create_order(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state
		.flow
		.create_order(&claims, request)
		.await
		.map_err(map_err)?;
	Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
	let orders = state
		.flow
		.list_orders(&claims, query.status)
		.await
		.map_err(map_err)?;
	Ok(Json(orders))
}

async fn get_order(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state.flow.get_order(&claims, id).await.map_err(map_err)?;
	Ok(Json(order))
}

async fn cancel_order(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state.flow.cancel_order(&claims, id).await.map_err(map_err)?;
	Ok(Json(order))
}

// ---- restaurant handlers ----

async fn create_restaurant(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Json(request): Json<CreateRestaurantRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let restaurant = state
		.flow
		.create_restaurant(&claims, request)
		.await
		.map_err(map_err)?;
	Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn restaurant_orders(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
	Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
	let orders = state
		.flow
		.restaurant_orders(&claims, id, query.status)
		.await
		.map_err(map_err)?;
	Ok(Json(orders))
}

async fn restaurant_update_status(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path((id, order_id)): Path<(Uuid, Uuid)>,
	Json(request): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state
		.flow
		.restaurant_update_status(&claims, id, order_id, request.status)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

async fn add_menu_item(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
	Json(request): Json<CreateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let item = state
		.flow
		.add_menu_item(&claims, id, request)
		.await
		.map_err(map_err)?;
	Ok((StatusCode::CREATED, Json(item)))
}

async fn list_restaurants(
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
	let restaurants = state.flow.list_restaurants().await.map_err(map_err)?;
	Ok(Json(restaurants))
}

async fn get_restaurant(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
	let restaurant = state.flow.get_restaurant(id).await.map_err(map_err)?;
	Ok(Json(restaurant))
}

async fn menu(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
	let items = state.flow.menu(id).await.map_err(map_err)?;
	Ok(Json(items))
}

// ---- delivery handlers ----

async fn available_orders(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
	let orders = state
		.flow
		.available_for_delivery(&claims)
		.await
		.map_err(map_err)?;
	Ok(Json(orders))
}

async fn active_deliveries(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
	let orders = state
		.flow
		.active_deliveries(&claims)
		.await
		.map_err(map_err)?;
	Ok(Json(orders))
}

async fn dashboard(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
) -> Result<impl IntoResponse, ApiError> {
	let dashboard = state.flow.dashboard(&claims).await.map_err(map_err)?;
	Ok(Json(dashboard))
}

async fn accept_order(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state.flow.accept_order(&claims, id).await.map_err(map_err)?;
	Ok(Json(order))
}

async fn delivery_update_status(
	State(state): State<AppState>,
	Authenticated(claims): Authenticated,
	Path(id): Path<Uuid>,
	Json(request): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
	let order = state
		.flow
		.update_status(&claims, id, request.status)
		.await
		.map_err(map_err)?;
	Ok(Json(order))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn conflict_errors_carry_the_actual_status() {
		let err = map_err(OrderFlowError::AlreadyClaimed {
			current_status: OrderStatus::OutForDelivery,
		});
		match err {
			ApiError::Conflict {
				error_type,
				current_status,
				..
			} => {
				assert_eq!(error_type, "ALREADY_CLAIMED");
				assert_eq!(current_status, Some(OrderStatus::OutForDelivery));
			}
			other => panic!("expected conflict, got {other:?}"),
		}
	}

	#[test]
	fn not_found_maps_to_404() {
		let err = map_err(OrderFlowError::OrderNotFound(Uuid::new_v4()));
		assert_eq!(err.status_code(), 404);
	}

	#[test]
	fn storage_failures_are_opaque_internals() {
		let err = map_err(OrderFlowError::Storage("disk on fire".to_string()));
		match err {
			ApiError::Internal { message } => assert!(!message.contains("disk")),
			other => panic!("expected internal, got {other:?}"),
		}
	}
}
