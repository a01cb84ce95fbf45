//! Message rendering for operator and customer notifications.
//!
//! Pure functions from order state to message text. Formatting never fails:
//! missing optional fields render as fixed placeholders, and the status to
//! customer-template mapping is an explicit table where "no notification"
//! is a visible `None` arm. Formatting is independent of delivery outcome.

use relay_types::{
	ActionButton, Customer, CustomerPayload, Order, OrderStatus, PaymentClaim, PaymentMethod,
};
use rust_decimal::Decimal;

/// Placeholder rendered for an absent username.
const UNKNOWN_USER: &str = "inconnu";

/// Renders a currency amount with exactly two decimal places.
///
/// The engine never rounds; callers supply already-rounded figures.
pub fn money(amount: Decimal) -> String {
	format!("{:.2}", amount)
}

/// Username of the order's customer, or the fixed placeholder.
fn display_username(customer: &Customer) -> &str {
	customer.username.as_deref().unwrap_or(UNKNOWN_USER)
}

/// Resolves the identity line for a claim, preferring the claiming user
/// passed in the request over the customer recorded on the order.
fn claimant_line(order: &Order, claimant: Option<&CustomerPayload>) -> String {
	let username = claimant
		.and_then(|c| c.username.as_deref())
		.or(order.customer.username.as_deref())
		.unwrap_or(UNKNOWN_USER);
	let id = claimant
		.and_then(|c| c.id)
		.unwrap_or(order.customer.external_id);
	format!("Client: @{} (id {})", username, id)
}

/// Operator notification for a freshly created order.
pub fn operator_new_order(order: &Order, btc_address: &str) -> String {
	let items = order
		.line_items
		.iter()
		.map(|item| {
			format!(
				"- {} x{} — {} €",
				item.name,
				item.quantity,
				money(item.unit_price)
			)
		})
		.collect::<Vec<_>>()
		.join("\n");

	format!(
		"🧾 <b>NOUVELLE COMMANDE {code}</b>\n\
		 Client: @{username} (id {id})\n\n\
		 <b>Produits:</b>\n{items}\n\n\
		 💶 Total: <b>{total} €</b>\n\
		 💰 Paiement: <b>BTC / Transcash</b>\n\
		 Adresse BTC: <code>{btc}</code>\n\
		 Statut: <b>{status}</b>",
		code = order.code,
		username = display_username(&order.customer),
		id = order.customer.external_id,
		items = items,
		total = money(order.total_amount),
		btc = btc_address,
		status = order.status,
	)
}

/// Action controls attached to the new-order notification.
///
/// Each control re-invokes a lifecycle event with the order code pre-bound.
pub fn order_actions(code: &str) -> Vec<ActionButton> {
	vec![
		ActionButton::new("✅ Confirmer payé", "confirm-paid", code),
		ActionButton::new("❌ Annuler", "cancel", code),
		ActionButton::new("📦 Expédié", "mark-shipped", code),
	]
}

/// Operator notification for a customer payment claim.
pub fn operator_claim(
	order: &Order,
	claim: &PaymentClaim,
	claimant: Option<&CustomerPayload>,
	btc_address: &str,
) -> String {
	match claim.method {
		PaymentMethod::Btc => format!(
			"🔔 <b>CLIENT A CLIQUÉ \"J'AI PAYÉ (BTC)\"</b>\n\
			 Commande: <b>{code}</b>\n\
			 {client}\n\
			 Total: <b>{total} €</b>\n\
			 Adresse BTC: <code>{btc}</code>",
			code = order.code,
			client = claimant_line(order, claimant),
			total = money(order.total_amount),
			btc = btc_address,
		),
		PaymentMethod::Voucher => format!(
			"🎫 <b>CODE TRANSCASH REÇU</b>\n\
			 Commande: <b>{code}</b>\n\
			 {client}\n\
			 Total: <b>{total} €</b>\n\n\
			 ➡️ Code: <code>{proof}</code>",
			code = order.code,
			client = claimant_line(order, claimant),
			total = money(order.total_amount),
			proof = claim.proof_code.as_deref().unwrap_or(UNKNOWN_USER),
		),
	}
}

/// Customer notification for a status change.
///
/// Explicit table from status to template; `Pending` deliberately maps to
/// no notification (an extension point, not an error).
pub fn customer_status_message(order: &Order) -> Option<String> {
	match order.status {
		OrderStatus::Paid => Some(format!(
			"✅ Paiement confirmé pour ta commande <b>{}</b>.\n\
			 Nous préparons ton colis, tu seras prévenu à l'expédition.",
			order.code
		)),
		OrderStatus::Cancelled => Some(format!(
			"❌ Ta commande <b>{}</b> a été annulée.",
			order.code
		)),
		OrderStatus::Shipped => Some(format!(
			"📦 Ta commande <b>{}</b> a été expédiée !",
			order.code
		)),
		OrderStatus::Pending => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use relay_types::OrderLineItem;

	fn sample_order(username: Option<&str>) -> Order {
		Order {
			code: "CMD-1234".to_string(),
			customer: Customer {
				external_id: 42,
				username: username.map(|u| u.to_string()),
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
		}
	}

	#[test]
	fn test_money_always_two_decimals() {
		assert_eq!(money(Decimal::new(1250, 2)), "12.50");
		assert_eq!(money(Decimal::new(25, 0)), "25.00");
		assert_eq!(money(Decimal::ZERO), "0.00");
	}

	#[test]
	fn test_new_order_rendering() {
		let text = operator_new_order(&sample_order(Some("alice")), "bc1qtest");
		assert!(text.contains("NOUVELLE COMMANDE CMD-1234"));
		assert!(text.contains("Truffle x2 — 12.50 €"));
		assert!(text.contains("25.00 €"));
		assert!(text.contains("@alice (id 42)"));
		assert!(text.contains("<code>bc1qtest</code>"));
		assert!(text.contains("PENDING"));
	}

	#[test]
	fn test_missing_username_renders_placeholder() {
		let text = operator_new_order(&sample_order(None), "bc1qtest");
		assert!(text.contains("@inconnu"));
	}

	#[test]
	fn test_order_actions_bound_to_code() {
		let actions = order_actions("CMD-1234");
		assert_eq!(actions.len(), 3);
		assert_eq!(actions[0].callback, "confirm-paid:CMD-1234");
		assert_eq!(actions[1].callback, "cancel:CMD-1234");
		assert_eq!(actions[2].callback, "mark-shipped:CMD-1234");
	}

	#[test]
	fn test_claim_prefers_request_user_over_order_customer() {
		let order = sample_order(Some("alice"));
		let claim = PaymentClaim {
			method: PaymentMethod::Btc,
			proof_code: None,
			claimed_at: Utc::now(),
		};
		let claimant = CustomerPayload {
			id: Some(99),
			username: Some("bob".to_string()),
		};

		let text = operator_claim(&order, &claim, Some(&claimant), "bc1qtest");
		assert!(text.contains("@bob (id 99)"));

		let text = operator_claim(&order, &claim, None, "bc1qtest");
		assert!(text.contains("@alice (id 42)"));
	}

	#[test]
	fn test_voucher_claim_shows_proof_code() {
		let order = sample_order(Some("alice"));
		let claim = PaymentClaim {
			method: PaymentMethod::Voucher,
			proof_code: Some("ABC123XYZ".to_string()),
			claimed_at: Utc::now(),
		};
		let text = operator_claim(&order, &claim, None, "bc1qtest");
		assert!(text.contains("CODE TRANSCASH"));
		assert!(text.contains("<code>ABC123XYZ</code>"));
	}

	#[test]
	fn test_customer_template_table() {
		let mut order = sample_order(Some("alice"));

		order.status = OrderStatus::Paid;
		assert!(customer_status_message(&order)
			.unwrap()
			.contains("Paiement confirmé"));

		order.status = OrderStatus::Cancelled;
		assert!(customer_status_message(&order).unwrap().contains("annulée"));

		order.status = OrderStatus::Shipped;
		assert!(customer_status_message(&order)
			.unwrap()
			.contains("expédiée"));

		order.status = OrderStatus::Pending;
		assert!(customer_status_message(&order).is_none());
	}
}
