use crate::domain::money::Amount;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local identifier of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PaymentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Checkout,
    Pending,
    Processing,
    Completed,
    Failed,
    Void,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Checkout => "checkout",
            PaymentState::Pending => "pending",
            PaymentState::Processing => "processing",
            PaymentState::Completed => "completed",
            PaymentState::Failed => "failed",
            PaymentState::Void => "void",
        }
    }

    /// States from which the payment can still settle either way.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            PaymentState::Checkout | PaymentState::Pending | PaymentState::Processing
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted by the payment state machine.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PaymentEvent {
    StartedProcessing,
    Pend,
    Complete,
    Failure,
    /// The provider declined this attempt but the payment stays open for a retry.
    Decline,
    Void,
}

impl PaymentEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentEvent::StartedProcessing => "started_processing",
            PaymentEvent::Pend => "pend",
            PaymentEvent::Complete => "complete",
            PaymentEvent::Failure => "failure",
            PaymentEvent::Decline => "decline",
            PaymentEvent::Void => "void",
        }
    }

    pub fn target(&self) -> PaymentState {
        match self {
            PaymentEvent::StartedProcessing | PaymentEvent::Decline => PaymentState::Processing,
            PaymentEvent::Pend => PaymentState::Pending,
            PaymentEvent::Complete => PaymentState::Completed,
            PaymentEvent::Failure => PaymentState::Failed,
            PaymentEvent::Void => PaymentState::Void,
        }
    }

    pub fn allowed_from(&self, state: PaymentState) -> bool {
        match self {
            PaymentEvent::Pend => {
                matches!(state, PaymentState::Checkout | PaymentState::Processing)
            }
            PaymentEvent::Void => state.is_open() || state == PaymentState::Completed,
            _ => state.is_open(),
        }
    }
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local payment record owned by exactly one order.
///
/// `state` is only reachable through [`Payment::fire`], so every change goes
/// through the legal-transition table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    /// Back-reference to the owning order.
    pub order_id: String,
    pub amount: Amount,
    /// Identifier of the payment at the provider, e.g. `tr_WDqYK6vllg`.
    #[serde(default)]
    pub provider_payment_id: Option<String>,
    #[serde(default = "initial_state")]
    state: PaymentState,
    #[serde(default)]
    amount_refunded: Option<Amount>,
}

fn initial_state() -> PaymentState {
    PaymentState::Checkout
}

impl Payment {
    pub fn new(id: impl Into<PaymentId>, order_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            amount,
            provider_payment_id: None,
            state: initial_state(),
            amount_refunded: None,
        }
    }

    pub fn with_provider_id(mut self, provider_payment_id: impl Into<String>) -> Self {
        self.provider_payment_id = Some(provider_payment_id.into());
        self
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn amount_refunded(&self) -> Option<&Amount> {
        self.amount_refunded.as_ref()
    }

    /// Checks whether `event` is legal from the current state without firing it.
    pub fn can_fire(&self, event: PaymentEvent) -> Result<()> {
        if event.allowed_from(self.state) {
            Ok(())
        } else {
            Err(GatewayError::InvalidTransition {
                entity: "payment",
                event: event.to_string(),
                from: self.state.to_string(),
            })
        }
    }

    /// Fires a transition, returning the new state.
    pub fn fire(&mut self, event: PaymentEvent) -> Result<PaymentState> {
        self.can_fire(event)?;
        self.state = event.target();
        Ok(self.state)
    }

    /// Records the refunded amount last reported by the provider.
    pub fn record_refunded(&mut self, refunded: Amount) -> Result<()> {
        self.amount.ensure_same_currency(&refunded)?;
        self.amount_refunded = Some(refunded);
        Ok(())
    }
}
