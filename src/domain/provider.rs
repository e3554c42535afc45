use crate::domain::money::Amount;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment statuses reported by the provider.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProviderStatus {
    Open,
    Pending,
    Authorized,
    Paid,
    Canceled,
    Expired,
    Failed,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Open => "open",
            ProviderStatus::Pending => "pending",
            ProviderStatus::Authorized => "authorized",
            ProviderStatus::Paid => "paid",
            ProviderStatus::Canceled => "canceled",
            ProviderStatus::Expired => "expired",
            ProviderStatus::Failed => "failed",
        }
    }
}

impl FromStr for ProviderStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(ProviderStatus::Open),
            "pending" => Ok(ProviderStatus::Pending),
            "authorized" => Ok(ProviderStatus::Authorized),
            "paid" => Ok(ProviderStatus::Paid),
            "canceled" => Ok(ProviderStatus::Canceled),
            "expired" => Ok(ProviderStatus::Expired),
            "failed" => Ok(ProviderStatus::Failed),
            other => Err(GatewayError::UnsupportedStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a payment as reported by the provider.
///
/// `status` is kept as the raw string so an unknown value surfaces as
/// [`GatewayError::UnsupportedStatus`] at reconciliation time instead of a
/// decoding failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPayment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(
        default,
        alias = "amountRefunded",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_refunded: Option<Amount>,
}

impl ProviderPayment {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            id: None,
            status: status.into(),
            amount: None,
            amount_refunded: None,
        }
    }

    pub fn with_refunded(mut self, refunded: Amount) -> Self {
        self.amount_refunded = Some(refunded);
        self
    }

    /// Decodes and validates a provider payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let payment: ProviderPayment = serde_json::from_slice(bytes)
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;
        payment.validate()?;
        Ok(payment)
    }

    pub fn validate(&self) -> Result<()> {
        if self.status.trim().is_empty() {
            return Err(GatewayError::ValidationError(
                "Provider status must not be empty".to_string(),
            ));
        }
        if let Some(amount) = &self.amount {
            amount.validate()?;
        }
        if let Some(refunded) = &self.amount_refunded {
            refunded.validate()?;
        }
        Ok(())
    }

    /// Parses the raw status into the known vocabulary.
    pub fn parsed_status(&self) -> Result<ProviderStatus> {
        self.status.parse()
    }
}
