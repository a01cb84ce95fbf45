//! Message delivery module for the relay system.
//!
//! This module wraps the external messaging capability behind a transport
//! trait and a service that never propagates a remote failure: every
//! transport fault is flattened into a `delivered = false` outcome with a
//! logged diagnostic, so a notification failure can never abort the state
//! mutation that triggered it.

use async_trait::async_trait;
use relay_types::{DeliveryOutcome, OutboundMessage};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod telegram;
}

/// Errors that can occur inside a messenger transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when building the transport from configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for messenger transports.
///
/// A transport takes a formatted message and attempts to hand it to the
/// channel's acceptance point. Remote-reported failures are expressed as a
/// `DeliveryOutcome` with `delivered = false`; only transport-level faults
/// (connection errors) surface as `DeliveryError`.
#[async_trait]
pub trait MessengerInterface: Send + Sync {
	/// Sends a message to the channel and reports the outcome.
	async fn send(&self, message: &OutboundMessage) -> Result<DeliveryOutcome, DeliveryError>;
}

/// Service that dispatches notifications over the configured transport.
///
/// The service is constructed without a transport when messaging is not
/// configured; in that mode every dispatch is a logged no-op so order
/// intake keeps working.
pub struct DeliveryService {
	/// The underlying transport, if messaging is configured.
	transport: Option<Box<dyn MessengerInterface>>,
}

impl DeliveryService {
	/// Creates a DeliveryService around the given transport.
	pub fn new(transport: Box<dyn MessengerInterface>) -> Self {
		Self {
			transport: Some(transport),
		}
	}

	/// Creates a DeliveryService that drops every message.
	pub fn disabled() -> Self {
		Self { transport: None }
	}

	/// Returns true if a transport is configured.
	pub fn is_enabled(&self) -> bool {
		self.transport.is_some()
	}

	/// Dispatches a notification, converting every failure into a
	/// `delivered = false` outcome. This method never errors.
	pub async fn dispatch(&self, message: OutboundMessage) -> DeliveryOutcome {
		let transport = match &self.transport {
			Some(transport) => transport,
			None => {
				tracing::debug!(
					recipient = message.recipient,
					"Messaging not configured, dropping notification"
				);
				return DeliveryOutcome::failed(None);
			},
		};

		match transport.send(&message).await {
			Ok(outcome) => {
				if !outcome.delivered {
					tracing::warn!(
						recipient = message.recipient,
						response = ?outcome.raw_response,
						"Messaging channel rejected notification"
					);
				}
				outcome
			},
			Err(e) => {
				tracing::warn!(
					recipient = message.recipient,
					error = %e,
					"Failed to reach messaging channel"
				);
				DeliveryOutcome::failed(None)
			},
		}
	}
}
