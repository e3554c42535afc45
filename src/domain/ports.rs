use super::method::PaymentMethod;
use super::order::Order;
use super::payment::PaymentId;
use super::provider::ProviderPayment;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for orders and the payments they own.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, number: &str) -> Result<Option<Order>>;
    /// Resolves a payment id to the number of the order that owns it.
    async fn order_number_for(&self, payment_id: &PaymentId) -> Result<Option<String>>;
    async fn all_orders(&self) -> Result<Vec<Order>>;
}

/// The provider's API, as far as this crate needs it.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn fetch_payment(&self, provider_payment_id: &str) -> Result<ProviderPayment>;
    async fn available_methods(&self) -> Result<Vec<PaymentMethod>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type PaymentProviderBox = Box<dyn PaymentProvider>;
