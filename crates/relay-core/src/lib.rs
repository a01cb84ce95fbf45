//! Order lifecycle engine for the relay system.
//!
//! This module owns the rules of the order lifecycle: which operations are
//! valid, who may trigger them, what gets persisted, and which notification
//! goes to whom on each accepted event. State mutations commit regardless
//! of delivery outcome; a lost notification is recovered by the operator
//! re-triggering the same idempotent event.

use chrono::Utc;
use rand::Rng;
use relay_delivery::DeliveryService;
use relay_storage::{OrderStore, StoreError};
use relay_types::{
	CreateOrderRequest, Customer, CustomerPayload, Order, OrderStatus, OutboundMessage,
	PaymentClaim, PaymentMethod, SecretString, UpdateStatusRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

pub mod formatter;

/// Bounded retries for order-code generation before giving up on a
/// saturated code space.
const MAX_CODE_ATTEMPTS: usize = 100;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Malformed or missing required fields; no state was mutated.
	#[error("{0}")]
	InvalidInput(String),
	/// Unknown order code; no state was mutated.
	#[error("Order not found")]
	NotFound,
	/// Missing or wrong operator credential; no state was mutated and
	/// nothing about order existence is revealed.
	#[error("Unauthorized")]
	Unauthorized,
	/// Unexpected fault; detail is logged server-side only.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl From<StoreError> for EngineError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::NotFound => EngineError::NotFound,
			other => EngineError::Internal(other.to_string()),
		}
	}
}

/// Settings the engine needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct EngineSettings {
	/// Settlement address returned to customers for out-of-band payment.
	pub btc_address: String,
	/// Chat id of the operator; operator notifications are skipped when
	/// messaging is not configured.
	pub operator_chat_id: Option<i64>,
	/// Shared operator secret. When unset, operator operations are
	/// disabled entirely, never silently open.
	pub operator_secret: Option<SecretString>,
	/// Default order-listing size.
	pub list_default_limit: usize,
	/// Hard ceiling on the order-listing size.
	pub list_max_limit: usize,
}

/// Receipt returned to the storefront after order creation.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
	/// Generated order code.
	pub order_code: String,
	/// Configured settlement address.
	pub btc_address: String,
}

/// The order lifecycle engine.
///
/// The engine is the only component permitted to mutate order records. It
/// validates every event, applies it through the store's atomic mutation
/// primitive, and dispatches the corresponding notification best-effort.
pub struct OrderEngine {
	/// The order store, single source of truth for order state.
	store: Arc<dyn OrderStore>,
	/// Best-effort notification dispatcher.
	delivery: Arc<DeliveryService>,
	/// Engine settings.
	settings: EngineSettings,
}

impl std::fmt::Debug for OrderEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OrderEngine")
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

impl OrderEngine {
	/// Creates a new engine over the given store and dispatcher.
	pub fn new(
		store: Arc<dyn OrderStore>,
		delivery: Arc<DeliveryService>,
		settings: EngineSettings,
	) -> Self {
		Self {
			store,
			delivery,
			settings,
		}
	}

	/// Creates an order from a storefront submission.
	///
	/// Validates the payload, generates a unique `CMD-####` code
	/// (regenerating on collision), inserts the order at `Pending`, and
	/// notifies the operator with the full rendering plus action controls.
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<OrderReceipt, EngineError> {
		let customer = validate_customer(request.user)?;
		validate_items(&request.items)?;

		let now = Utc::now();
		let mut order = Order {
			code: generate_code(),
			customer,
			line_items: request.items,
			total_amount: request.total_eur,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
			payment_claims: Vec::new(),
		};

		// Code uniqueness is enforced by the store; regenerate on collision.
		let mut attempts = 1;
		loop {
			match self.store.insert(order.clone()).await {
				Ok(()) => break,
				Err(StoreError::DuplicateCode(_)) if attempts < MAX_CODE_ATTEMPTS => {
					attempts += 1;
					order.code = generate_code();
				},
				Err(StoreError::DuplicateCode(_)) => {
					return Err(EngineError::Internal(
						"Exhausted order code space".to_string(),
					));
				},
				Err(e) => return Err(e.into()),
			}
		}

		tracing::info!(
			order_code = %order.code,
			customer_id = order.customer.external_id,
			total = %formatter::money(order.total_amount),
			"New order"
		);

		self.notify_operator(
			formatter::operator_new_order(&order, &self.settings.btc_address),
			formatter::order_actions(&order.code),
		)
		.await;

		Ok(OrderReceipt {
			order_code: order.code,
			btc_address: self.settings.btc_address.clone(),
		})
	}

	/// Records a customer payment claim and relays it to the operator.
	///
	/// Claims are informational: the order status is never changed here.
	pub async fn record_claim(
		&self,
		order_code: Option<String>,
		method: PaymentMethod,
		proof_code: Option<String>,
		claimant: Option<CustomerPayload>,
	) -> Result<(), EngineError> {
		let code = require_code(order_code)?;

		let proof = match method {
			PaymentMethod::Btc => None,
			PaymentMethod::Voucher => {
				let proof = proof_code.unwrap_or_default().trim().to_string();
				if proof.len() < 6 {
					return Err(EngineError::InvalidInput("Invalid code".to_string()));
				}
				Some(proof)
			},
		};

		let claim = PaymentClaim {
			method,
			proof_code: proof,
			claimed_at: Utc::now(),
		};

		let appended = claim.clone();
		let order = self
			.store
			.update_with(
				&code,
				Box::new(move |order| order.payment_claims.push(appended)),
			)
			.await?;

		tracing::info!(
			order_code = %order.code,
			method = %claim.method,
			"Payment claim recorded"
		);

		self.notify_operator(
			formatter::operator_claim(
				&order,
				&claim,
				claimant.as_ref(),
				&self.settings.btc_address,
			),
			Vec::new(),
		)
		.await;

		Ok(())
	}

	/// Applies an operator status decision to an order.
	///
	/// Sets the status, bumps `updated_at`, and sends exactly one customer
	/// notification selected by the status template table. Re-applying the
	/// current status is idempotent and re-sends the notification. The
	/// transition table is deliberately permissive: any status is reachable
	/// from any other.
	pub async fn apply_operator_status(
		&self,
		request: UpdateStatusRequest,
	) -> Result<Order, EngineError> {
		self.authorize(request.secret.as_deref())?;

		let code = require_code(request.order_code)?;
		let status: OrderStatus = request
			.status
			.ok_or_else(|| EngineError::InvalidInput("Missing status".to_string()))?
			.parse()
			.map_err(|e: relay_types::ParseStatusError| {
				EngineError::InvalidInput(e.to_string())
			})?;

		let order = self
			.store
			.update_with(
				&code,
				Box::new(move |order| {
					order.status = status;
					order.updated_at = Utc::now();
				}),
			)
			.await?;

		tracing::info!(order_code = %order.code, status = %order.status, "Status updated");

		if let Some(text) = formatter::customer_status_message(&order) {
			self.delivery
				.dispatch(OutboundMessage::text(order.customer.external_id, text))
				.await;
		}

		Ok(order)
	}

	/// Returns the most recently created orders, newest first.
	pub async fn list_orders(
		&self,
		secret: Option<&str>,
		limit: Option<usize>,
	) -> Result<Vec<Order>, EngineError> {
		self.authorize(secret)?;

		let mut orders = self.store.list_all().await?;
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		let limit = limit
			.unwrap_or(self.settings.list_default_limit)
			.min(self.settings.list_max_limit);
		orders.truncate(limit);

		Ok(orders)
	}

	/// Checks the caller credential against the configured operator secret.
	fn authorize(&self, credential: Option<&str>) -> Result<(), EngineError> {
		match (&self.settings.operator_secret, credential) {
			(Some(secret), Some(candidate)) if secret.matches(candidate) => Ok(()),
			// No secret configured means operator operations are disabled.
			_ => Err(EngineError::Unauthorized),
		}
	}

	/// Sends an operator notification, best-effort.
	async fn notify_operator(&self, text: String, actions: Vec<relay_types::ActionButton>) {
		let chat_id = match self.settings.operator_chat_id {
			Some(chat_id) => chat_id,
			None => {
				tracing::debug!("No operator chat configured, skipping notification");
				return;
			},
		};
		self.delivery
			.dispatch(OutboundMessage::with_actions(chat_id, text, actions))
			.await;
	}
}

/// Generates a candidate order code, `CMD-` plus four digits.
fn generate_code() -> String {
	let n: u32 = rand::thread_rng().gen_range(1000..=9999);
	format!("CMD-{}", n)
}

fn require_code(order_code: Option<String>) -> Result<String, EngineError> {
	match order_code {
		Some(code) if !code.is_empty() => Ok(code),
		_ => Err(EngineError::InvalidInput("Missing orderCode".to_string())),
	}
}

fn validate_customer(user: Option<CustomerPayload>) -> Result<Customer, EngineError> {
	let user = user.unwrap_or_default();
	let external_id = user
		.id
		.ok_or_else(|| EngineError::InvalidInput("Missing user.id".to_string()))?;
	Ok(Customer {
		external_id,
		username: user.username,
	})
}

fn validate_items(items: &[relay_types::OrderLineItem]) -> Result<(), EngineError> {
	if items.is_empty() {
		return Err(EngineError::InvalidInput("Empty items".to_string()));
	}
	for item in items {
		if item.unit_price < Decimal::ZERO {
			return Err(EngineError::InvalidInput("Invalid item price".to_string()));
		}
		if item.quantity < 1 {
			return Err(EngineError::InvalidInput(
				"Invalid item quantity".to_string(),
			));
		}
	}
	Ok(())
}
