//! API types for the mealflow HTTP API.
//!
//! This module defines the request and response types for the order,
//! restaurant and delivery endpoints, plus the structured API error type
//! with its HTTP status mapping. Rejected transitions always carry the
//! order's current status so clients can refresh their view without a
//! second round trip.

use crate::{Order, OrderStatus, PaymentMethod};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One line of a checkout request. Prices are never accepted from the
/// client; they are resolved from the menu server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
	pub menu_item_id: Uuid,
	pub quantity: u32,
	#[serde(default)]
	pub special_instructions: Option<String>,
}

/// Request body for `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
	pub restaurant_id: Uuid,
	pub items: Vec<OrderItemRequest>,
	pub delivery_address: String,
	#[serde(default)]
	pub special_instructions: Option<String>,
	#[serde(default)]
	pub phone_number: Option<String>,
	pub payment_method: PaymentMethod,
}

/// Request body for the status-update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
	pub status: OrderStatus,
}

/// Request body for `POST /api/restaurants`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
	pub name: String,
	pub address: String,
	pub delivery_fee: Decimal,
}

/// Request body for `POST /api/restaurants/{id}/menu`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	pub price: Decimal,
	#[serde(default = "default_available")]
	pub available: bool,
}

fn default_available() -> bool {
	true
}

/// One row of the delivery dashboard's recent-deliveries list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDelivery {
	pub order_id: Uuid,
	pub restaurant_name: String,
	pub completed_at: DateTime<Utc>,
	pub total: Decimal,
}

/// Response body for `GET /api/delivery/dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDashboard {
	/// The courier's current out-for-delivery order, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub active_delivery: Option<Order>,
	/// Orders this courier completed today.
	pub completed_today: u64,
	/// Sum of order totals completed by this courier today.
	pub total_earnings_today: Decimal,
	/// Unclaimed READY_FOR_PICKUP orders across the platform.
	pub available_orders: u64,
	/// Orders this courier completed today, most recent first.
	pub recent_deliveries: Vec<RecentDelivery>,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	/// Stable error code ("INVALID_TRANSITION", "ALREADY_CLAIMED", ...).
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// The order's actual status at rejection time, for conflict errors.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub current_status: Option<OrderStatus>,
	/// Additional error context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or invalid credential (401).
	Unauthorized { message: String },
	/// Authenticated but not allowed to touch the resource (403).
	Forbidden { message: String },
	/// Resource does not exist or is not visible to the caller (404).
	NotFound { message: String },
	/// Malformed request (400).
	BadRequest {
		error_type: String,
		message: String,
	},
	/// Business-rule conflict: invalid transition, finalized order or a
	/// lost compare-and-swap race (409).
	Conflict {
		error_type: String,
		message: String,
		current_status: Option<OrderStatus>,
	},
	/// Infrastructure failure (500).
	Internal { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::Unauthorized { .. } => 401,
			ApiError::Forbidden { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::BadRequest { .. } => 400,
			ApiError::Conflict { .. } => 409,
			ApiError::Internal { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message, current_status) = match self {
			ApiError::Unauthorized { message } => {
				("UNAUTHORIZED".to_string(), message.clone(), None)
			}
			ApiError::Forbidden { message } => ("FORBIDDEN".to_string(), message.clone(), None),
			ApiError::NotFound { message } => ("NOT_FOUND".to_string(), message.clone(), None),
			ApiError::BadRequest {
				error_type,
				message,
			} => (error_type.clone(), message.clone(), None),
			ApiError::Conflict {
				error_type,
				message,
				current_status,
			} => (error_type.clone(), message.clone(), *current_status),
			ApiError::Internal { message } => {
				("INTERNAL_ERROR".to_string(), message.clone(), None)
			}
		};

		ErrorResponse {
			error,
			message,
			current_status,
			details: None,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::Internal { message } => write!(f, "Internal Server Error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn conflict_response_carries_current_status() {
		let err = ApiError::Conflict {
			error_type: "ALREADY_CLAIMED".into(),
			message: "order already claimed".into(),
			current_status: Some(OrderStatus::OutForDelivery),
		};
		assert_eq!(err.status_code(), 409);

		let body = err.to_error_response();
		assert_eq!(body.error, "ALREADY_CLAIMED");
		assert_eq!(body.current_status, Some(OrderStatus::OutForDelivery));

		let json = serde_json::to_value(&body).unwrap();
		assert_eq!(json["currentStatus"], "OUT_FOR_DELIVERY");
	}

	#[test]
	fn non_conflict_responses_omit_status() {
		let body = ApiError::NotFound {
			message: "no such order".into(),
		}
		.to_error_response();
		let json = serde_json::to_value(&body).unwrap();
		assert!(json.get("currentStatus").is_none());
	}
}
