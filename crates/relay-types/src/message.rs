//! Outbound message types for the messaging channel.
//!
//! This module defines the dispatcher's wire-agnostic view of a
//! notification: a recipient, formatted text, and optional action controls
//! the operator can activate from the message itself.

use serde::{Deserialize, Serialize};

/// A labeled trigger attached to an operator-facing notification.
///
/// When activated, the callback re-invokes a specific lifecycle event with
/// the order code pre-bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
	/// Text shown on the button.
	pub label: String,
	/// Callback payload, `<event>:<order-code>`.
	pub callback: String,
}

impl ActionButton {
	/// Creates an action button binding an event name to an order code.
	pub fn new(label: &str, event: &str, order_code: &str) -> Self {
		Self {
			label: label.to_string(),
			callback: format!("{}:{}", event, order_code),
		}
	}
}

/// A notification ready for delivery over the messaging channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
	/// Messaging-channel identifier of the recipient.
	pub recipient: i64,
	/// Formatted message text (HTML markup).
	pub text: String,
	/// Action controls attached to the message, if any.
	#[serde(default)]
	pub actions: Vec<ActionButton>,
}

impl OutboundMessage {
	/// Creates a plain text message with no action controls.
	pub fn text(recipient: i64, text: String) -> Self {
		Self {
			recipient,
			text,
			actions: Vec::new(),
		}
	}

	/// Creates a message carrying action controls.
	pub fn with_actions(recipient: i64, text: String, actions: Vec<ActionButton>) -> Self {
		Self {
			recipient,
			text,
			actions,
		}
	}
}

/// Whether an outbound notification reached the channel's acceptance point.
///
/// Delivery is best-effort: a `delivered = false` outcome is reported, never
/// raised, so a messaging outage can not fail the state mutation that
/// triggered the notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
	/// True if the channel accepted the message.
	pub delivered: bool,
	/// Raw remote response body, when one was received.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub raw_response: Option<serde_json::Value>,
}

impl DeliveryOutcome {
	/// Outcome for a message the channel accepted.
	pub fn delivered(raw_response: Option<serde_json::Value>) -> Self {
		Self {
			delivered: true,
			raw_response,
		}
	}

	/// Outcome for a message that did not reach the channel.
	pub fn failed(raw_response: Option<serde_json::Value>) -> Self {
		Self {
			delivered: false,
			raw_response,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_action_button_callback_binding() {
		let button = ActionButton::new("✅ Payé", "confirm-paid", "CMD-1234");
		assert_eq!(button.label, "✅ Payé");
		assert_eq!(button.callback, "confirm-paid:CMD-1234");
	}

	#[test]
	fn test_text_message_has_no_actions() {
		let message = OutboundMessage::text(42, "hello".to_string());
		assert!(message.actions.is_empty());
	}
}
