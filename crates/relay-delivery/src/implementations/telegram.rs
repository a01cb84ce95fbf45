//! Telegram bot-API messenger transport.
//!
//! Posts `sendMessage` calls with HTML parse mode and renders action
//! controls as an inline keyboard. The remote `ok` flag decides the
//! delivery outcome; a malformed response body counts as undelivered.

use crate::{DeliveryError, MessengerInterface};
use async_trait::async_trait;
use relay_types::{DeliveryOutcome, OutboundMessage, SecretString};
use serde_json::json;

/// Messenger transport speaking the Telegram bot API.
pub struct TelegramMessenger {
	/// HTTP client with connection pooling.
	client: reqwest::Client,
	/// Bot token; appears only in the request URL, never in logs.
	bot_token: SecretString,
	/// Base URL of the bot API.
	api_url: String,
}

impl TelegramMessenger {
	/// Creates a new transport against the given bot API.
	pub fn new(api_url: String, bot_token: SecretString) -> Result<Self, DeliveryError> {
		if bot_token.is_empty() {
			return Err(DeliveryError::Configuration(
				"bot_token cannot be empty".to_string(),
			));
		}
		let client = reqwest::Client::builder()
			.timeout(std::time::Duration::from_secs(30))
			.build()
			.map_err(|e| DeliveryError::Configuration(e.to_string()))?;
		Ok(Self {
			client,
			bot_token,
			api_url: api_url.trim_end_matches('/').to_string(),
		})
	}

	/// Builds the `sendMessage` payload for a message.
	fn build_payload(message: &OutboundMessage) -> serde_json::Value {
		let mut payload = json!({
			"chat_id": message.recipient,
			"text": message.text,
			"parse_mode": "HTML",
			"disable_web_page_preview": true,
		});

		if !message.actions.is_empty() {
			let keyboard: Vec<serde_json::Value> = message
				.actions
				.iter()
				.map(|action| {
					json!([{
						"text": action.label,
						"callback_data": action.callback,
					}])
				})
				.collect();
			payload["reply_markup"] = json!({ "inline_keyboard": keyboard });
		}

		payload
	}
}

#[async_trait]
impl MessengerInterface for TelegramMessenger {
	async fn send(&self, message: &OutboundMessage) -> Result<DeliveryOutcome, DeliveryError> {
		let url = format!(
			"{}/bot{}/sendMessage",
			self.api_url,
			self.bot_token.expose_secret()
		);
		let payload = Self::build_payload(message);

		let response = self
			.client
			.post(&url)
			.json(&payload)
			.send()
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;

		// The bot API reports failures in the body, not only via status.
		match response.json::<serde_json::Value>().await {
			Ok(body) => {
				let delivered = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
				Ok(DeliveryOutcome {
					delivered,
					raw_response: Some(body),
				})
			},
			Err(_) => Ok(DeliveryOutcome::failed(None)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_types::ActionButton;

	#[test]
	fn test_empty_token_rejected() {
		let result = TelegramMessenger::new(
			"https://api.telegram.org".to_string(),
			SecretString::from(""),
		);
		assert!(matches!(result, Err(DeliveryError::Configuration(_))));
	}

	#[test]
	fn test_payload_without_actions() {
		let message = OutboundMessage::text(42, "🧾 <b>NOUVELLE COMMANDE</b>".to_string());
		let payload = TelegramMessenger::build_payload(&message);

		assert_eq!(payload["chat_id"], 42);
		assert_eq!(payload["parse_mode"], "HTML");
		assert_eq!(payload["disable_web_page_preview"], true);
		assert!(payload.get("reply_markup").is_none());
	}

	#[test]
	fn test_payload_renders_inline_keyboard() {
		let message = OutboundMessage::with_actions(
			42,
			"order".to_string(),
			vec![
				ActionButton::new("✅ Payé", "confirm-paid", "CMD-1234"),
				ActionButton::new("❌ Annuler", "cancel", "CMD-1234"),
			],
		);
		let payload = TelegramMessenger::build_payload(&message);

		let keyboard = &payload["reply_markup"]["inline_keyboard"];
		assert_eq!(keyboard.as_array().unwrap().len(), 2);
		assert_eq!(keyboard[0][0]["callback_data"], "confirm-paid:CMD-1234");
		assert_eq!(keyboard[1][0]["text"], "❌ Annuler");
	}
}
