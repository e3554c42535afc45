use crate::domain::order::{Order, OrderState};
use crate::domain::payment::PaymentState;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PaymentStateRecord<'a> {
    order: &'a str,
    payment: &'a str,
    payment_state: PaymentState,
    order_state: OrderState,
}

/// Writes one `order,payment,payment_state,order_state` row per payment.
pub struct StateWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StateWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Rows come out in the given order sequence, payments sorted by id.
    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        for order in orders {
            let mut payments: Vec<_> = order.payments().iter().collect();
            payments.sort_by(|a, b| a.id.cmp(&b.id));
            for payment in payments {
                self.writer.serialize(PaymentStateRecord {
                    order: &order.number,
                    payment: &payment.id.0,
                    payment_state: payment.state(),
                    order_state: order.state(),
                })?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
