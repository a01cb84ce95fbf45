//! Common types module for the order relay system.
//!
//! This module defines the core data types and structures shared across
//! the relay components: the order model, the messaging types used by the
//! dispatcher, and the HTTP request/response structures.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Outbound message types for the messaging channel.
pub mod message;
/// Order model types: orders, line items, statuses and payment claims.
pub mod order;
/// Secure string type for bot tokens and operator secrets.
pub mod secret_string;

// Re-export all types for convenient access
pub use api::*;
pub use message::*;
pub use order::*;
pub use secret_string::SecretString;
