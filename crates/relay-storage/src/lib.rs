//! Order store module for the relay system.
//!
//! This module provides the abstraction over the keyed order store, the
//! single source of truth for order state. Backends implement `OrderStore`;
//! the in-memory implementation is the only one shipped today, but the
//! lifecycle engine only ever sees the trait, so the backing can be swapped
//! without touching it.

use async_trait::async_trait;
use relay_types::Order;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during order store operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when the requested order code is unknown.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when inserting an order code that already exists.
	#[error("Duplicate order code: {0}")]
	DuplicateCode(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Mutation applied atomically to a stored order.
pub type OrderMutation = Box<dyn FnOnce(&mut Order) + Send>;

/// Trait defining the interface for order store backends.
///
/// The store holds exactly one record per order code. Uniqueness is
/// enforced at insertion, and `update_with` performs its read-modify-write
/// under the backend's own lock so concurrent updates to one code cannot
/// interleave.
#[async_trait]
pub trait OrderStore: Send + Sync {
	/// Retrieves the order stored under the given code.
	async fn get(&self, code: &str) -> Result<Order, StoreError>;

	/// Inserts a new order, rejecting duplicates of its code.
	async fn insert(&self, order: Order) -> Result<(), StoreError>;

	/// Checks whether an order code exists.
	async fn contains(&self, code: &str) -> Result<bool, StoreError>;

	/// Applies a mutation to the order under the given code and returns the
	/// updated record. Fails with `NotFound` if the code is unknown.
	async fn update_with(&self, code: &str, mutate: OrderMutation) -> Result<Order, StoreError>;

	/// Returns all stored orders, in no particular order.
	async fn list_all(&self) -> Result<Vec<Order>, StoreError>;
}

/// Type alias for store factory functions.
///
/// This is the function signature every store implementation provides to
/// create instances from its configuration section.
pub type StoreFactory = fn(&toml::Value) -> Result<Box<dyn OrderStore>, StoreError>;
