//! Configuration module for the order relay.
//!
//! This module provides structures and utilities for managing the relay
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` environment-variable interpolation and validates that all
//! required values are properly set before the service starts.

use regex::Regex;
use relay_types::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the order relay.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Identity of this relay instance.
	pub service: ServiceConfig,
	/// HTTP API server settings.
	#[serde(default)]
	pub api: ApiConfig,
	/// Messaging channel settings. When absent the relay starts with
	/// notifications disabled and only records orders.
	pub messaging: Option<MessagingConfig>,
	/// Out-of-band payment settings.
	#[serde(default)]
	pub payment: PaymentConfig,
	/// Operator/admin settings.
	#[serde(default)]
	pub admin: AdminConfig,
	/// Order store backend settings.
	#[serde(default)]
	pub storage: StorageConfig,
}

/// Identity configuration for the relay instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
	/// Unique identifier for this relay instance.
	pub id: String,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Allowed CORS origin; `*` allows any origin.
	#[serde(default = "default_cors_origin")]
	pub cors_origin: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			cors_origin: default_cors_origin(),
		}
	}
}

/// Configuration for the messaging channel.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
	/// Which messenger implementation to use.
	#[serde(default = "default_messenger")]
	pub implementation: String,
	/// Bot token for the channel API.
	pub bot_token: SecretString,
	/// Chat id of the human operator receiving order notifications.
	pub operator_chat_id: i64,
	/// Base URL of the channel API.
	#[serde(default = "default_messaging_api_url")]
	pub api_url: String,
}

/// Configuration for out-of-band payment instructions.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
	/// Settlement address included in order confirmations.
	#[serde(default = "default_btc_address")]
	pub btc_address: String,
}

impl Default for PaymentConfig {
	fn default() -> Self {
		Self {
			btc_address: default_btc_address(),
		}
	}
}

/// Configuration for operator-facing admin operations.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
	/// Shared secret for status updates and the order listing. When unset,
	/// those operations are disabled rather than left open.
	pub secret: Option<SecretString>,
	/// Default number of orders returned by the listing.
	#[serde(default = "default_list_limit")]
	pub default_limit: usize,
	/// Hard ceiling on the listing size.
	#[serde(default = "default_list_ceiling")]
	pub max_limit: usize,
}

impl Default for AdminConfig {
	fn default() -> Self {
		Self {
			secret: None,
			default_limit: default_list_limit(),
			max_limit: default_list_ceiling(),
		}
	}
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	#[serde(default = "default_storage")]
	pub primary: String,
	/// Map of store implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			primary: default_storage(),
			implementations: HashMap::new(),
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	10000
}

fn default_cors_origin() -> String {
	"*".to_string()
}

fn default_messenger() -> String {
	"telegram".to_string()
}

fn default_messaging_api_url() -> String {
	"https://api.telegram.org".to_string()
}

fn default_btc_address() -> String {
	"bc1q7ttd985n9nlky9gqe9vxwqq33u007ssvq0dnql".to_string()
}

fn default_list_limit() -> usize {
	10
}

fn default_list_ceiling() -> usize {
	50
}

fn default_storage() -> String {
	"memory".to_string()
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		raw.parse()
	}

	/// Validates the configuration to ensure all required fields are set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		if let Some(ref messaging) = self.messaging {
			if messaging.bot_token.is_empty() {
				return Err(ConfigError::Validation(
					"Messaging bot_token cannot be empty".into(),
				));
			}
			if messaging.operator_chat_id == 0 {
				return Err(ConfigError::Validation(
					"Messaging operator_chat_id cannot be 0".into(),
				));
			}
			if messaging.implementation.is_empty() {
				return Err(ConfigError::Validation(
					"Messaging implementation cannot be empty".into(),
				));
			}
		}

		if self.payment.btc_address.is_empty() {
			return Err(ConfigError::Validation(
				"Payment btc_address cannot be empty".into(),
			));
		}

		if let Some(ref secret) = self.admin.secret {
			if secret.is_empty() {
				return Err(ConfigError::Validation(
					"Admin secret cannot be empty when set".into(),
				));
			}
		}
		if self.admin.default_limit == 0 {
			return Err(ConfigError::Validation(
				"Admin default_limit must be at least 1".into(),
			));
		}
		if self.admin.default_limit > self.admin.max_limit {
			return Err(ConfigError::Validation(format!(
				"Admin default_limit ({}) cannot exceed max_limit ({})",
				self.admin.default_limit, self.admin.max_limit
			)));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string, resolving environment variables
/// and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
