use crate::domain::method::PaymentMethod;
use crate::domain::order::Order;
use crate::domain::payment::PaymentId;
use crate::domain::ports::PaymentProviderBox;
use crate::domain::provider::ProviderPayment;
use crate::domain::reconciler::{self, Reconciliation};
use crate::error::{GatewayError, Result};

/// The Mollie payment gateway as seen by the order side.
///
/// Wraps a [`PaymentProvider`](crate::domain::ports::PaymentProvider) and
/// applies the statuses it reports to local orders.
pub struct MollieGateway {
    provider: PaymentProviderBox,
}

impl MollieGateway {
    pub fn new(provider: PaymentProviderBox) -> Self {
        Self { provider }
    }

    /// Applies a provider status snapshot to one payment of `order`.
    pub fn update_by_status(
        &self,
        provider_payment: &ProviderPayment,
        order: &mut Order,
        payment_id: &PaymentId,
    ) -> Result<Reconciliation> {
        let local = order.payment(payment_id)?;
        reconciler::ensure_matches_provider_id(
            provider_payment,
            local.provider_payment_id.as_deref(),
        )?;
        reconciler::reconcile(provider_payment, order, payment_id)
    }

    /// Fetches the current provider status of a payment and applies it.
    pub async fn sync_payment(
        &self,
        order: &mut Order,
        payment_id: &PaymentId,
    ) -> Result<Reconciliation> {
        let provider_id = order
            .payment(payment_id)?
            .provider_payment_id
            .clone()
            .ok_or_else(|| {
                GatewayError::ValidationError(format!(
                    "Payment {payment_id} has no provider reference"
                ))
            })?;
        let provider_payment = self.provider.fetch_payment(&provider_id).await?;
        self.update_by_status(&provider_payment, order, payment_id)
    }

    /// Payment methods offered by the provider, unchanged.
    pub async fn available_methods(&self) -> Result<Vec<PaymentMethod>> {
        self.provider.available_methods().await
    }
}
