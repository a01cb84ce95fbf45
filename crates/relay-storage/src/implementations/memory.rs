//! In-memory order store backend.
//!
//! Stores orders in a HashMap for the lifetime of the process. Nothing
//! survives a restart; the relay provides no expiry or eviction.

use crate::{OrderMutation, OrderStore, StoreError};
use async_trait::async_trait;
use relay_types::Order;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory order store implementation.
pub struct MemoryStore {
	/// The keyed store protected by a read-write lock.
	orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl MemoryStore {
	/// Creates a new empty MemoryStore.
	pub fn new() -> Self {
		Self {
			orders: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStore for MemoryStore {
	async fn get(&self, code: &str) -> Result<Order, StoreError> {
		let orders = self.orders.read().await;
		orders.get(code).cloned().ok_or(StoreError::NotFound)
	}

	async fn insert(&self, order: Order) -> Result<(), StoreError> {
		let mut orders = self.orders.write().await;
		if orders.contains_key(&order.code) {
			return Err(StoreError::DuplicateCode(order.code));
		}
		orders.insert(order.code.clone(), order);
		Ok(())
	}

	async fn contains(&self, code: &str) -> Result<bool, StoreError> {
		let orders = self.orders.read().await;
		Ok(orders.contains_key(code))
	}

	async fn update_with(&self, code: &str, mutate: OrderMutation) -> Result<Order, StoreError> {
		// The write lock is held across the whole read-modify-write, so two
		// concurrent updates to one code cannot lose each other's write.
		let mut orders = self.orders.write().await;
		let order = orders.get_mut(code).ok_or(StoreError::NotFound)?;
		mutate(order);
		Ok(order.clone())
	}

	async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
		let orders = self.orders.read().await;
		Ok(orders.values().cloned().collect())
	}
}

/// Factory function to create a memory store from configuration.
///
/// Configuration parameters:
/// - None required for the memory store
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn OrderStore>, StoreError> {
	Ok(Box::new(MemoryStore::new()))
}
