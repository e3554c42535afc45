//! Application layer orchestrating reconciliation.
//!
//! [`gateway::MollieGateway`] applies provider statuses to orders and passes
//! the provider's payment methods through. [`engine::ReconciliationEngine`]
//! wraps it with an order store and per-payment locking for notification
//! handling.

pub mod engine;
pub mod gateway;
pub mod locks;
