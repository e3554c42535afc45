//! Domain model: money, payments, orders, provider payloads and the
//! status reconciler that ties them together.

pub mod method;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod provider;
pub mod reconciler;
