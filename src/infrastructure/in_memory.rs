use crate::domain::method::PaymentMethod;
use crate::domain::order::Order;
use crate::domain::payment::PaymentId;
use crate::domain::ports::{OrderStore, PaymentProvider};
use crate::domain::provider::ProviderPayment;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Orders {
    by_number: HashMap<String, Order>,
    payment_index: HashMap<PaymentId, String>,
}

/// A thread-safe in-memory store for orders.
///
/// Keeps a payment id → order number index next to the orders so webhook
/// notifications, which only carry a payment reference, can find their order.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Orders>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut inner = self.inner.write().await;
        for payment in order.payments() {
            if let Some(owner) = inner.payment_index.get(&payment.id)
                && owner != &order.number
            {
                return Err(GatewayError::ValidationError(format!(
                    "Payment {} already belongs to order {}",
                    payment.id, owner
                )));
            }
        }
        for payment in order.payments() {
            inner
                .payment_index
                .insert(payment.id.clone(), order.number.clone());
        }
        inner.by_number.insert(order.number.clone(), order);
        Ok(())
    }

    async fn get(&self, number: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.by_number.get(number).cloned())
    }

    async fn order_number_for(&self, payment_id: &PaymentId) -> Result<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner.payment_index.get(payment_id).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.by_number.values().cloned().collect())
    }
}

/// A provider backed by canned responses instead of the HTTP API.
#[derive(Default, Clone)]
pub struct FixtureProvider {
    payments: Arc<RwLock<HashMap<String, ProviderPayment>>>,
    methods: Arc<Vec<PaymentMethod>>,
}

impl FixtureProvider {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Self {
            payments: Arc::default(),
            methods: Arc::new(methods),
        }
    }

    /// Sets the status the provider reports for `provider_payment_id`.
    pub async fn set_payment(
        &self,
        provider_payment_id: impl Into<String>,
        payment: ProviderPayment,
    ) {
        self.payments
            .write()
            .await
            .insert(provider_payment_id.into(), payment);
    }
}

#[async_trait]
impl PaymentProvider for FixtureProvider {
    async fn fetch_payment(&self, provider_payment_id: &str) -> Result<ProviderPayment> {
        let payments = self.payments.read().await;
        payments
            .get(provider_payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::PaymentNotFound(provider_payment_id.to_string()))
    }

    async fn available_methods(&self) -> Result<Vec<PaymentMethod>> {
        Ok(self.methods.as_ref().clone())
    }
}
