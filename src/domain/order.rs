use crate::domain::money::Amount;
use crate::domain::payment::{Payment, PaymentEvent, PaymentId, PaymentState};
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Cart,
    Address,
    Delivery,
    Payment,
    Confirm,
    Complete,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Cart => "cart",
            OrderState::Address => "address",
            OrderState::Delivery => "delivery",
            OrderState::Payment => "payment",
            OrderState::Confirm => "confirm",
            OrderState::Complete => "complete",
        }
    }

    /// Checkout steps at which a payment outcome still moves the order.
    pub fn awaits_payment(&self) -> bool {
        matches!(self, OrderState::Payment | OrderState::Confirm)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OrderEvent {
    Next,
    ReturnToPayment,
    Complete,
}

impl OrderEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEvent::Next => "next",
            OrderEvent::ReturnToPayment => "return_to_payment",
            OrderEvent::Complete => "complete",
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Before/after snapshot of one payment event applied to an order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub payment_id: PaymentId,
    pub payment_before: PaymentState,
    pub payment_after: PaymentState,
    pub order_before: OrderState,
    pub order_after: OrderState,
}

impl TransitionOutcome {
    /// True when neither the payment nor the order changed, e.g. on a replayed status.
    pub fn is_noop(&self) -> bool {
        self.payment_before == self.payment_after && self.order_before == self.order_after
    }
}

/// An order and the payments it owns.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub number: String,
    pub total: Amount,
    #[serde(default = "initial_state")]
    state: OrderState,
    #[serde(default)]
    payments: Vec<Payment>,
}

fn initial_state() -> OrderState {
    OrderState::Cart
}

impl Order {
    pub fn new(number: impl Into<String>, total: Amount) -> Self {
        Self {
            number: number.into(),
            total,
            state: initial_state(),
            payments: Vec::new(),
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, id: &PaymentId) -> Result<&Payment> {
        self.payments
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| GatewayError::PaymentNotFound(id.to_string()))
    }

    /// Attaches a payment to this order.
    pub fn add_payment(&mut self, payment: Payment) -> Result<()> {
        if payment.order_id != self.number {
            return Err(GatewayError::ValidationError(format!(
                "Payment {} belongs to order {}, not {}",
                payment.id, payment.order_id, self.number
            )));
        }
        if self.payments.iter().any(|p| p.id == payment.id) {
            return Err(GatewayError::ValidationError(format!(
                "Duplicate payment id {}",
                payment.id
            )));
        }
        self.total.ensure_same_currency(&payment.amount)?;
        self.payments.push(payment);
        Ok(())
    }

    /// Checks that the loaded record is internally consistent.
    pub fn validate(&self) -> Result<()> {
        self.total.validate()?;
        for (i, payment) in self.payments.iter().enumerate() {
            if payment.order_id != self.number {
                return Err(GatewayError::ValidationError(format!(
                    "Payment {} belongs to order {}, not {}",
                    payment.id, payment.order_id, self.number
                )));
            }
            if self.payments[..i].iter().any(|p| p.id == payment.id) {
                return Err(GatewayError::ValidationError(format!(
                    "Duplicate payment id {}",
                    payment.id
                )));
            }
            payment.amount.validate()?;
            self.total.ensure_same_currency(&payment.amount)?;
        }
        self.validate_states()
    }

    /// Rejects order/payment state combinations the transitions cannot produce.
    fn validate_states(&self) -> Result<()> {
        let consistent = match self.state {
            OrderState::Cart | OrderState::Address | OrderState::Delivery => self
                .payments
                .iter()
                .all(|p| p.state() == PaymentState::Checkout),
            OrderState::Payment => true,
            OrderState::Confirm => self.has_usable_payment(),
            OrderState::Complete => self.is_covered()?,
        };
        if consistent {
            Ok(())
        } else {
            Err(GatewayError::ValidationError(format!(
                "Order {} in state '{}' does not match its payments",
                self.number, self.state
            )))
        }
    }

    pub fn can_fire(&self, event: OrderEvent) -> Result<OrderState> {
        let next = match (event, self.state) {
            (OrderEvent::Next, OrderState::Cart) => Some(OrderState::Address),
            (OrderEvent::Next, OrderState::Address) => Some(OrderState::Delivery),
            (OrderEvent::Next, OrderState::Delivery) => Some(OrderState::Payment),
            (OrderEvent::Next, OrderState::Payment) if self.has_usable_payment() => {
                Some(OrderState::Confirm)
            }
            (OrderEvent::ReturnToPayment, state) if state.awaits_payment() => {
                Some(OrderState::Payment)
            }
            (OrderEvent::Complete, state) if state.awaits_payment() => {
                self.is_covered()?.then_some(OrderState::Complete)
            }
            _ => None,
        };
        next.ok_or_else(|| GatewayError::InvalidTransition {
            entity: "order",
            event: event.to_string(),
            from: self.state.to_string(),
        })
    }

    /// Fires an order transition, returning the new state.
    pub fn fire(&mut self, event: OrderEvent) -> Result<OrderState> {
        self.state = self.can_fire(event)?;
        Ok(self.state)
    }

    /// Walks the checkout forward until `target` is reached.
    pub fn advance_to(&mut self, target: OrderState) -> Result<OrderState> {
        while self.state != target {
            self.fire(OrderEvent::Next)?;
        }
        Ok(self.state)
    }

    /// Fires `event` on one of this order's payments and cascades the result
    /// into the order state.
    ///
    /// When the payment already sits in the event's target state the payment
    /// transition is skipped; the cascade is still evaluated so a replay can
    /// repair an order left behind. Both transitions are validated before
    /// anything is written.
    pub fn apply_payment_event(
        &mut self,
        payment_id: &PaymentId,
        event: PaymentEvent,
    ) -> Result<TransitionOutcome> {
        let index = self
            .payments
            .iter()
            .position(|p| &p.id == payment_id)
            .ok_or_else(|| GatewayError::PaymentNotFound(payment_id.to_string()))?;

        let mut payment = self.payments[index].clone();
        let payment_before = payment.state();
        if payment_before == event.target() {
            tracing::debug!(
                payment = %payment_id,
                state = %payment_before,
                "payment already in target state"
            );
        } else {
            payment.fire(event)?;
        }

        let order_before = self.state;
        let order_after = advance_order_on_payment_change(self, &payment, event)?;

        let mut next = self.clone();
        next.payments[index] = payment;
        if order_after != order_before {
            let order_event = match order_after {
                OrderState::Complete => OrderEvent::Complete,
                OrderState::Payment => OrderEvent::ReturnToPayment,
                other => {
                    return Err(GatewayError::InvalidTransition {
                        entity: "order",
                        event: format!("advance to {other}"),
                        from: order_before.to_string(),
                    });
                }
            };
            next.fire(order_event)?;
        }

        let outcome = TransitionOutcome {
            payment_id: payment_id.clone(),
            payment_before,
            payment_after: next.payments[index].state(),
            order_before,
            order_after: next.state,
        };
        *self = next;
        Ok(outcome)
    }

    /// Stores the refunded amount last reported for one of this order's payments.
    pub fn record_refunded(&mut self, payment_id: &PaymentId, refunded: Amount) -> Result<()> {
        self.payments
            .iter_mut()
            .find(|p| &p.id == payment_id)
            .ok_or_else(|| GatewayError::PaymentNotFound(payment_id.to_string()))?
            .record_refunded(refunded)
    }

    fn has_usable_payment(&self) -> bool {
        self.payments
            .iter()
            .any(|p| p.state().is_open() || p.state() == PaymentState::Completed)
    }

    fn is_covered(&self) -> Result<bool> {
        Ok(self.completed_total(None)?.value >= self.total.value)
    }

    /// Sum of the completed payments, with `replacing` standing in for the
    /// payment that shares its id.
    fn completed_total(&self, replacing: Option<&Payment>) -> Result<Amount> {
        self.payments
            .iter()
            .map(|p| match replacing {
                Some(updated) if updated.id == p.id => updated,
                _ => p,
            })
            .filter(|p| p.state() == PaymentState::Completed)
            .try_fold(Amount::zero(self.total.currency.clone()), |sum, p| {
                sum.checked_add(&p.amount)
            })
    }
}

/// Computes the order state that follows from `payment` having received `event`.
///
/// `payment` is the post-transition payment; it replaces the order's copy with
/// the same id when totals are computed. Pure: nothing is mutated. Fails only
/// when the completed payments cannot be summed.
pub fn advance_order_on_payment_change(
    order: &Order,
    payment: &Payment,
    event: PaymentEvent,
) -> Result<OrderState> {
    let current = order.state();
    if !current.awaits_payment() {
        return Ok(current);
    }
    let next = match event {
        PaymentEvent::Complete => {
            if order.completed_total(Some(payment))?.value >= order.total.value {
                OrderState::Complete
            } else {
                current
            }
        }
        PaymentEvent::Failure | PaymentEvent::Decline | PaymentEvent::Void => OrderState::Payment,
        PaymentEvent::StartedProcessing | PaymentEvent::Pend => current,
    };
    Ok(next)
}
