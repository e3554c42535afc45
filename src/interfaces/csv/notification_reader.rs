use crate::application::engine::Notification;
use crate::domain::money::{Amount, Currency};
use crate::domain::payment::PaymentId;
use crate::domain::provider::ProviderPayment;
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a notifications file: `payment, status, refunded_currency, refunded_value`.
#[derive(Debug, Deserialize)]
struct NotificationRecord {
    payment: String,
    status: String,
    refunded_currency: Option<String>,
    refunded_value: Option<Decimal>,
}

impl TryFrom<NotificationRecord> for Notification {
    type Error = GatewayError;

    fn try_from(record: NotificationRecord) -> Result<Self> {
        let amount_refunded = match (record.refunded_currency, record.refunded_value) {
            (Some(currency), Some(value)) => Some(Amount::new(Currency::new(currency)?, value)?),
            (None, None) => None,
            _ => {
                return Err(GatewayError::MalformedPayload(format!(
                    "Notification for {} has an incomplete refunded amount",
                    record.payment
                )));
            }
        };
        let payload = ProviderPayment {
            id: None,
            status: record.status,
            amount: None,
            amount_refunded,
        };
        payload.validate()?;
        Ok(Notification {
            payment_id: PaymentId(record.payment),
            payload,
        })
    }
}

/// Reads provider notifications from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing refund columns may be left out.
pub struct NotificationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> NotificationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates notifications.
    pub fn notifications(self) -> impl Iterator<Item = Result<Notification>> {
        self.reader
            .into_deserialize::<NotificationRecord>()
            .map(|result| result.map_err(GatewayError::from).and_then(Notification::try_from))
    }
}
