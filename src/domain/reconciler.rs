//! Translation of provider payment statuses into local payment transitions.
//!
//! | provider status        | payment event        | order (via cascade) |
//! |------------------------|----------------------|---------------------|
//! | `paid`                 | `complete`           | `complete`          |
//! | `canceled`, `expired`  | `failure`            | `payment`           |
//! | `failed`               | `decline`            | `payment`           |
//! | `open`                 | `started_processing` | unchanged           |
//! | `pending`, `authorized`| `pend`               | unchanged           |
//!
//! Anything else is rejected with [`GatewayError::UnsupportedStatus`].

use crate::domain::order::{Order, TransitionOutcome};
use crate::domain::payment::{PaymentEvent, PaymentId};
use crate::domain::provider::{ProviderPayment, ProviderStatus};
use crate::error::{GatewayError, Result};

/// Result of reconciling one provider status.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub status: ProviderStatus,
    pub event: PaymentEvent,
    pub outcome: TransitionOutcome,
    /// Whether the payload reported a refunded amount different from the recorded one.
    pub refund_changed: bool,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.outcome.is_noop() && !self.refund_changed
    }
}

/// Maps a provider status onto the payment event it implies.
///
/// `failed` deliberately maps to `decline`, which keeps the payment in
/// `processing` so the customer can retry.
pub fn payment_event_for(status: ProviderStatus) -> PaymentEvent {
    match status {
        ProviderStatus::Paid => PaymentEvent::Complete,
        ProviderStatus::Canceled | ProviderStatus::Expired => PaymentEvent::Failure,
        ProviderStatus::Failed => PaymentEvent::Decline,
        ProviderStatus::Open => PaymentEvent::StartedProcessing,
        ProviderStatus::Pending | ProviderStatus::Authorized => PaymentEvent::Pend,
    }
}

/// Applies a provider status to one of `order`'s payments.
///
/// The payload is validated and the status resolved before anything is
/// touched. The payment transition cascades into the order through
/// [`Order::apply_payment_event`]; transition errors are returned unchanged.
pub fn reconcile(
    provider: &ProviderPayment,
    order: &mut Order,
    payment_id: &PaymentId,
) -> Result<Reconciliation> {
    provider.validate()?;
    let status = provider.parsed_status().inspect_err(|_| {
        tracing::warn!(
            payment = %payment_id,
            status = %provider.status,
            "unsupported provider status"
        );
    })?;

    if let Some(refunded) = &provider.amount_refunded {
        order.payment(payment_id)?.amount.ensure_same_currency(refunded)?;
    }

    let event = payment_event_for(status);
    let outcome = order.apply_payment_event(payment_id, event)?;

    let mut refund_changed = false;
    if let Some(refunded) = &provider.amount_refunded {
        refund_changed = order.payment(payment_id)?.amount_refunded() != Some(refunded);
        order.record_refunded(payment_id, refunded.clone())?;
    }

    if outcome.is_noop() {
        if refund_changed {
            tracing::info!(
                payment = %payment_id,
                order = %order.number,
                %status,
                refunded = ?provider.amount_refunded,
                "recorded refunded amount"
            );
        } else {
            tracing::debug!(payment = %payment_id, %status, "status already reconciled");
        }
    } else {
        tracing::info!(
            payment = %payment_id,
            order = %order.number,
            %status,
            payment_state = %outcome.payment_after,
            order_state = %outcome.order_after,
            "reconciled provider status"
        );
    }

    Ok(Reconciliation {
        status,
        event,
        outcome,
        refund_changed,
    })
}

/// Rejects a payload whose provider id does not match the local payment.
pub fn ensure_matches_provider_id(
    provider: &ProviderPayment,
    expected: Option<&str>,
) -> Result<()> {
    match (provider.id.as_deref(), expected) {
        (Some(got), Some(want)) if got != want => Err(GatewayError::ValidationError(format!(
            "Provider payment {got} does not match local reference {want}"
        ))),
        _ => Ok(()),
    }
}
