//! Order model types for the relay system.
//!
//! This module defines the central `Order` entity together with its line
//! items, customer, status lifecycle and the append-only payment claim log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single product line inside an order.
///
/// Line items are immutable once the order has been created. Wire field
/// names follow the storefront payload (`nom`, `prix`, `qty`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
	/// Opaque product identifier, if the storefront supplied one.
	#[serde(rename = "id", skip_serializing_if = "Option::is_none", default)]
	pub product_id: Option<String>,
	/// Display name of the product.
	#[serde(rename = "nom", default)]
	pub name: String,
	/// Unit price in whole currency units with two-decimal precision.
	#[serde(rename = "prix", default)]
	pub unit_price: Decimal,
	/// Number of units ordered.
	#[serde(rename = "qty", default)]
	pub quantity: u32,
}

/// The customer who placed an order.
///
/// The external id doubles as the messaging recipient address; one customer
/// may place any number of orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
	/// Messaging-channel identifier of the customer.
	#[serde(rename = "id")]
	pub external_id: i64,
	/// Optional display name; rendered as a fixed placeholder when absent.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub username: Option<String>,
}

/// Method a customer claims to have paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
	/// Out-of-band BTC transfer to the configured settlement address.
	Btc,
	/// Prepaid voucher identified by a proof code.
	Voucher,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Btc => write!(f, "BTC"),
			PaymentMethod::Voucher => write!(f, "Transcash"),
		}
	}
}

/// A customer-submitted payment assertion.
///
/// Claims are informational: they are appended to the order and relayed to
/// the operator but never change the order status by themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentClaim {
	/// Claimed payment method.
	pub method: PaymentMethod,
	/// Proof code for voucher claims; absent for BTC claims.
	#[serde(rename = "proofCode", skip_serializing_if = "Option::is_none", default)]
	pub proof_code: Option<String>,
	/// When the claim was received.
	#[serde(rename = "claimedAt")]
	pub claimed_at: DateTime<Utc>,
}

/// Status of an order in the relay system.
///
/// This is a closed enumeration: no other value is ever observable on an
/// order. The transition table is deliberately permissive — any status may
/// be set from any prior status by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
	/// Initial status, set at creation.
	Pending,
	/// Operator confirmed the payment.
	Paid,
	/// Operator cancelled the order.
	Cancelled,
	/// Operator marked the order as shipped.
	Shipped,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "PENDING"),
			OrderStatus::Paid => write!(f, "PAID"),
			OrderStatus::Cancelled => write!(f, "CANCELLED"),
			OrderStatus::Shipped => write!(f, "SHIPPED"),
		}
	}
}

/// Error returned when parsing a status string that is not a member of the
/// lifecycle enumeration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"PENDING" => Ok(OrderStatus::Pending),
			"PAID" => Ok(OrderStatus::Paid),
			"CANCELLED" => Ok(OrderStatus::Cancelled),
			"SHIPPED" => Ok(OrderStatus::Shipped),
			other => Err(ParseStatusError(other.to_string())),
		}
	}
}

/// The central order entity.
///
/// Created exactly once on intake, mutated only through lifecycle events
/// (operator status updates and informational claim appends), never deleted
/// by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique human-readable identifier, primary key of the store.
	#[serde(rename = "orderCode")]
	pub code: String,
	/// The customer who placed the order.
	#[serde(rename = "user")]
	pub customer: Customer,
	/// Ordered, non-empty sequence of line items.
	#[serde(rename = "items")]
	pub line_items: Vec<OrderLineItem>,
	/// Caller-supplied total; not recomputed from line items.
	#[serde(rename = "totalEur")]
	pub total_amount: Decimal,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// When the order was created.
	#[serde(rename = "createdAt")]
	pub created_at: DateTime<Utc>,
	/// When the status was last mutated.
	#[serde(rename = "updatedAt")]
	pub updated_at: DateTime<Utc>,
	/// Append-only log of customer payment assertions.
	#[serde(rename = "paymentClaims", default)]
	pub payment_claims: Vec<PaymentClaim>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_round_trip() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::Paid,
			OrderStatus::Cancelled,
			OrderStatus::Shipped,
		] {
			let parsed: OrderStatus = status.to_string().parse().unwrap();
			assert_eq!(parsed, status);
		}
	}

	#[test]
	fn test_status_rejects_unknown_value() {
		let result = "REFUNDED".parse::<OrderStatus>();
		assert_eq!(result, Err(ParseStatusError("REFUNDED".to_string())));
	}

	#[test]
	fn test_line_item_wire_names() {
		let item: OrderLineItem =
			serde_json::from_str(r#"{"nom":"Truffle","prix":12.50,"qty":2}"#).unwrap();
		assert_eq!(item.name, "Truffle");
		assert_eq!(item.unit_price, Decimal::new(1250, 2));
		assert_eq!(item.quantity, 2);
		assert!(item.product_id.is_none());
	}

	#[test]
	fn test_line_item_numeric_defaults() {
		// Absent numeric fields default to zero; validation happens upstream.
		let item: OrderLineItem = serde_json::from_str(r#"{"nom":"Truffle"}"#).unwrap();
		assert_eq!(item.unit_price, Decimal::ZERO);
		assert_eq!(item.quantity, 0);
	}

	#[test]
	fn test_order_serializes_wire_names() {
		let order = Order {
			code: "CMD-1234".to_string(),
			customer: Customer {
				external_id: 42,
				username: Some("alice".to_string()),
			},
			line_items: vec![OrderLineItem {
				product_id: None,
				name: "Truffle".to_string(),
				unit_price: Decimal::new(1250, 2),
				quantity: 2,
			}],
			total_amount: Decimal::new(2500, 2),
			status: OrderStatus::Pending,
			created_at: Utc::now(),
			updated_at: Utc::now(),
			payment_claims: vec![],
		};

		let json = serde_json::to_value(&order).unwrap();
		assert_eq!(json["orderCode"], "CMD-1234");
		assert_eq!(json["user"]["id"], 42);
		assert_eq!(json["items"][0]["nom"], "Truffle");
		assert_eq!(json["status"], "PENDING");
	}
}
