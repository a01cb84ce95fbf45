//! API types for the order relay HTTP surface.
//!
//! This module defines the request and response types for the intake and
//! admin endpoints, plus the structured error type with its HTTP status
//! mapping. Wire field names follow the storefront payloads.

use crate::order::{Order, OrderLineItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer fields as submitted by the storefront.
///
/// The id is optional at the wire level; its absence is a validation
/// failure, not a deserialization failure, so the caller gets a stable
/// reason string instead of a parser error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPayload {
	/// Messaging-channel identifier of the customer.
	pub id: Option<i64>,
	/// Optional display name.
	pub username: Option<String>,
}

/// Request body for order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
	/// The submitting customer.
	pub user: Option<CustomerPayload>,
	/// Ordered product lines.
	#[serde(default)]
	pub items: Vec<OrderLineItem>,
	/// Caller-computed total; trusted as-is.
	#[serde(rename = "totalEur", default)]
	pub total_eur: Decimal,
}

/// Response body for a successful order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
	pub ok: bool,
	/// Generated order code.
	#[serde(rename = "orderCode")]
	pub order_code: String,
	/// Settlement address for out-of-band payment.
	#[serde(rename = "btcAddress")]
	pub btc_address: String,
}

/// Request body for a BTC payment claim.
#[derive(Debug, Clone, Deserialize)]
pub struct BtcClaimRequest {
	#[serde(rename = "orderCode")]
	pub order_code: Option<String>,
	/// Claiming user, when the storefront passes it along.
	pub user: Option<CustomerPayload>,
}

/// Request body for a voucher payment claim.
#[derive(Debug, Clone, Deserialize)]
pub struct VoucherClaimRequest {
	#[serde(rename = "orderCode")]
	pub order_code: Option<String>,
	/// Voucher proof code; trimmed length must be at least 6.
	pub code: Option<String>,
	/// Claiming user, when the storefront passes it along.
	pub user: Option<CustomerPayload>,
}

/// Request body for an operator status update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
	#[serde(rename = "orderCode")]
	pub order_code: Option<String>,
	/// Target status as a wire string; must parse into the enumeration.
	pub status: Option<String>,
	/// Operator credential.
	pub secret: Option<String>,
}

/// Response body for a successful status update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusResponse {
	pub ok: bool,
	/// The order after the update.
	pub order: Order,
}

/// Query parameters for the admin order listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
	/// Operator credential.
	pub secret: Option<String>,
	/// Maximum number of orders to return; clamped to the configured ceiling.
	pub limit: Option<usize>,
}

/// Response body for the admin order listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListOrdersResponse {
	pub ok: bool,
	pub orders: Vec<Order>,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
	pub ok: bool,
}

impl AckResponse {
	pub fn ok() -> Self {
		Self { ok: true }
	}
}

/// Error body returned on any failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub ok: bool,
	/// Machine-stable reason string.
	pub error: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or missing required fields (400).
	InvalidInput(String),
	/// Missing or wrong operator credential (401).
	Unauthorized,
	/// Unknown order code (404).
	NotFound,
	/// Unexpected fault; detail stays server-side (500).
	Internal,
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::InvalidInput(_) => 400,
			ApiError::Unauthorized => 401,
			ApiError::NotFound => 404,
			ApiError::Internal => 500,
		}
	}

	/// Convert to the wire error body.
	pub fn to_error_response(&self) -> ErrorResponse {
		let error = match self {
			ApiError::InvalidInput(reason) => reason.clone(),
			ApiError::Unauthorized => "Unauthorized".to_string(),
			ApiError::NotFound => "Order not found".to_string(),
			ApiError::Internal => "Server error".to_string(),
		};
		ErrorResponse { ok: false, error }
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::InvalidInput(reason) => write!(f, "Bad Request: {}", reason),
			ApiError::Unauthorized => write!(f, "Unauthorized"),
			ApiError::NotFound => write!(f, "Not Found"),
			ApiError::Internal => write!(f, "Internal Server Error"),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			401 => StatusCode::UNAUTHORIZED,
			404 => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		(status, Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_status_codes() {
		assert_eq!(ApiError::InvalidInput("Empty items".into()).status_code(), 400);
		assert_eq!(ApiError::Unauthorized.status_code(), 401);
		assert_eq!(ApiError::NotFound.status_code(), 404);
		assert_eq!(ApiError::Internal.status_code(), 500);
	}

	#[test]
	fn test_not_found_reason_string() {
		let body = ApiError::NotFound.to_error_response();
		assert!(!body.ok);
		assert_eq!(body.error, "Order not found");
	}

	#[test]
	fn test_internal_error_stays_generic() {
		let body = ApiError::Internal.to_error_response();
		assert_eq!(body.error, "Server error");
	}

	#[test]
	fn test_create_request_defaults() {
		let request: CreateOrderRequest =
			serde_json::from_str(r#"{"user":{"id":42}}"#).unwrap();
		assert!(request.items.is_empty());
		assert_eq!(request.total_eur, Decimal::ZERO);
	}
}
