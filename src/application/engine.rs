use super::gateway::MollieGateway;
use super::locks::KeyedLocks;
use crate::domain::order::Order;
use crate::domain::payment::PaymentId;
use crate::domain::ports::OrderStoreBox;
use crate::domain::provider::ProviderPayment;
use crate::domain::reconciler::Reconciliation;
use crate::error::{GatewayError, Result};

/// A provider status addressed to a local payment.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub payment_id: PaymentId,
    pub payload: ProviderPayment,
}

/// Entry point for webhook-style status notifications.
///
/// `ReconciliationEngine` owns the order store and processes each
/// notification under a lock on the payment id, then on the owning order, so
/// concurrent deliveries for the same payment are applied one at a time and
/// sibling payments of one order cannot overwrite each other.
pub struct ReconciliationEngine {
    store: OrderStoreBox,
    gateway: MollieGateway,
    payment_locks: KeyedLocks,
    order_locks: KeyedLocks,
}

impl ReconciliationEngine {
    /// Creates a new `ReconciliationEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding orders and their payments.
    /// * `gateway` - The gateway used to apply provider statuses.
    pub fn new(store: OrderStoreBox, gateway: MollieGateway) -> Self {
        Self {
            store,
            gateway,
            payment_locks: KeyedLocks::new(),
            order_locks: KeyedLocks::new(),
        }
    }

    /// Validates and stores an order so its payments can receive notifications.
    pub async fn register_order(&self, order: Order) -> Result<()> {
        order.validate()?;
        let _guard = self.order_locks.lock(&order.number).await;
        self.store.store(order).await
    }

    /// Applies a provider status to the addressed payment and persists the order.
    pub async fn process_notification(&self, notification: Notification) -> Result<Reconciliation> {
        let payment_id = &notification.payment_id;
        let _payment_guard = self.payment_locks.lock(&payment_id.0).await;
        let number = self.owning_order(payment_id).await?;
        let _order_guard = self.order_locks.lock(&number).await;

        let mut order = self.load(&number).await?;
        let result = self
            .gateway
            .update_by_status(&notification.payload, &mut order, payment_id)?;
        self.store.store(order).await?;
        Ok(result)
    }

    /// Fetches the payment's status from the provider and applies it.
    pub async fn sync_payment(&self, payment_id: &PaymentId) -> Result<Reconciliation> {
        let _payment_guard = self.payment_locks.lock(&payment_id.0).await;
        let number = self.owning_order(payment_id).await?;
        let _order_guard = self.order_locks.lock(&number).await;

        let mut order = self.load(&number).await?;
        let result = self.gateway.sync_payment(&mut order, payment_id).await?;
        self.store.store(order).await?;
        Ok(result)
    }

    /// All orders currently stored, sorted by number.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.store.all_orders().await?;
        orders.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(orders)
    }

    /// Consumes the engine and returns the final state of all orders.
    pub async fn into_results(self) -> Result<Vec<Order>> {
        self.orders().await
    }

    async fn owning_order(&self, payment_id: &PaymentId) -> Result<String> {
        self.store
            .order_number_for(payment_id)
            .await?
            .ok_or_else(|| GatewayError::PaymentNotFound(payment_id.to_string()))
    }

    async fn load(&self, number: &str) -> Result<Order> {
        self.store
            .get(number)
            .await?
            .ok_or_else(|| GatewayError::OrderNotFound(number.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Currency};
    use crate::domain::order::{OrderEvent, OrderState};
    use crate::domain::payment::{Payment, PaymentEvent, PaymentState};
    use crate::infrastructure::in_memory::{FixtureProvider, InMemoryOrderStore};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn eur(value: rust_decimal::Decimal) -> Amount {
        Amount::new(Currency::new("EUR").unwrap(), value).unwrap()
    }

    fn confirmed_order(number: &str, payments: &[(&str, rust_decimal::Decimal)]) -> Order {
        let total = payments.iter().map(|(_, v)| *v).sum();
        let mut order = Order::new(number, eur(total));
        order.advance_to(OrderState::Payment).unwrap();
        for (id, value) in payments {
            let mut payment = Payment::new(*id, number, eur(*value));
            payment.fire(PaymentEvent::StartedProcessing).unwrap();
            order.add_payment(payment).unwrap();
        }
        order.fire(OrderEvent::Next).unwrap();
        order
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(
            Box::new(InMemoryOrderStore::new()),
            MollieGateway::new(Box::new(FixtureProvider::new(Vec::new()))),
        )
    }

    fn notification(payment_id: &str, status: &str) -> Notification {
        Notification {
            payment_id: PaymentId::from(payment_id),
            payload: ProviderPayment::new(status),
        }
    }

    #[tokio::test]
    async fn test_notification_is_persisted() {
        let engine = engine();
        engine
            .register_order(confirmed_order("R1", &[("P1", dec!(10.00))]))
            .await
            .unwrap();

        engine
            .process_notification(notification("P1", "paid"))
            .await
            .unwrap();

        let results = engine.into_results().await.unwrap();
        assert_eq!(results[0].state(), OrderState::Complete);
        assert_eq!(results[0].payments()[0].state(), PaymentState::Completed);
    }

    #[tokio::test]
    async fn test_unknown_payment() {
        let engine = engine();
        assert!(matches!(
            engine.process_notification(notification("P404", "paid")).await,
            Err(GatewayError::PaymentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_persist() {
        let engine = engine();
        engine
            .register_order(confirmed_order("R1", &[("P1", dec!(10.00))]))
            .await
            .unwrap();

        let result = engine
            .process_notification(notification("P1", "chargeback"))
            .await;
        assert!(matches!(result, Err(GatewayError::UnsupportedStatus(_))));

        let results = engine.into_results().await.unwrap();
        assert_eq!(results[0].state(), OrderState::Confirm);
        assert_eq!(results[0].payments()[0].state(), PaymentState::Processing);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_apply_once() {
        let engine = Arc::new(engine());
        engine
            .register_order(confirmed_order("R1", &[("P1", dec!(10.00))]))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .process_notification(notification("P1", "paid"))
                    .await
                    .unwrap()
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if !handle.await.unwrap().is_noop() {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);

        let results = engine.orders().await.unwrap();
        assert_eq!(results[0].state(), OrderState::Complete);
    }

    #[tokio::test]
    async fn test_sibling_payments_do_not_lose_updates() {
        let engine = Arc::new(engine());
        engine
            .register_order(confirmed_order(
                "R1",
                &[("P1", dec!(4.00)), ("P2", dec!(6.00))],
            ))
            .await
            .unwrap();

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .process_notification(notification("P1", "paid"))
                    .await
            })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .process_notification(notification("P2", "paid"))
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let results = engine.orders().await.unwrap();
        let order = &results[0];
        assert!(
            order
                .payments()
                .iter()
                .all(|p| p.state() == PaymentState::Completed)
        );
        assert_eq!(order.state(), OrderState::Complete);
    }

    #[tokio::test]
    async fn test_register_order_rejects_inconsistent_order() {
        let engine = engine();
        let json = r#"{
            "number": "R1",
            "total": {"currency": "EUR", "value": "10.00"},
            "payments": [
                {"id": "P1", "order_id": "R2", "amount": {"currency": "EUR", "value": "10.00"}}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(matches!(
            engine.register_order(order).await,
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_payment_through_engine() {
        let provider = FixtureProvider::new(Vec::new());
        provider
            .set_payment("tr_1", ProviderPayment::new("expired"))
            .await;
        let engine = ReconciliationEngine::new(
            Box::new(InMemoryOrderStore::new()),
            MollieGateway::new(Box::new(provider)),
        );
        let total = eur(dec!(10.00));
        let mut order = Order::new("R1", total.clone());
        order.advance_to(OrderState::Payment).unwrap();
        let mut payment = Payment::new("P1", "R1", total).with_provider_id("tr_1");
        payment.fire(PaymentEvent::StartedProcessing).unwrap();
        order.add_payment(payment).unwrap();
        order.fire(OrderEvent::Next).unwrap();
        engine.register_order(order).await.unwrap();

        let result = engine.sync_payment(&PaymentId::from("P1")).await.unwrap();
        assert_eq!(result.outcome.payment_after, PaymentState::Failed);
        assert_eq!(result.outcome.order_after, OrderState::Payment);
    }
}
