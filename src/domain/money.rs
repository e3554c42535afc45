use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code, e.g. `EUR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(GatewayError::ValidationError(format!(
                "Invalid currency code '{code}'"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-negative monetary amount in a given currency.
///
/// The provider encodes the value as a decimal string (`"10.00"`), which
/// `rust_decimal`'s serde support reads and writes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub currency: Currency,
    pub value: Decimal,
}

impl Amount {
    pub fn new(currency: Currency, value: Decimal) -> Result<Self> {
        let amount = Self { currency, value };
        amount.validate()?;
        Ok(amount)
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            currency,
            value: Decimal::ZERO,
        }
    }

    /// Checks invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err(GatewayError::ValidationError(format!(
                "Amount must not be negative, got {} {}",
                self.value, self.currency
            )));
        }
        Ok(())
    }

    /// Adds two amounts of the same currency, failing instead of overflowing.
    pub fn checked_add(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_currency(other)?;
        let value = self.value.checked_add(other.value).ok_or_else(|| {
            GatewayError::ValidationError(format!("Amount overflow adding {other} to {self}"))
        })?;
        Ok(Self {
            currency: self.currency.clone(),
            value,
        })
    }

    pub fn ensure_same_currency(&self, other: &Amount) -> Result<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(GatewayError::ValidationError(format!(
                "Currency mismatch: {} vs {}",
                self.currency, other.currency
            )))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur() -> Currency {
        Currency::new("EUR").unwrap()
    }

    #[test]
    fn test_currency_validation() {
        assert!(Currency::new("EUR").is_ok());
        assert!(matches!(
            Currency::new("eur"),
            Err(GatewayError::ValidationError(_))
        ));
        assert!(matches!(
            Currency::new("EURO"),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_rejects_negative() {
        assert!(Amount::new(eur(), dec!(0.00)).is_ok());
        assert!(Amount::new(eur(), dec!(10.00)).is_ok());
        assert!(matches!(
            Amount::new(eur(), dec!(-1.00)),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_amount_deserializes_decimal_string() {
        let amount: Amount =
            serde_json::from_str(r#"{"currency": "EUR", "value": "12.50"}"#).unwrap();
        assert_eq!(amount.currency, eur());
        assert_eq!(amount.value, dec!(12.50));
    }

    #[test]
    fn test_amount_rejects_bad_currency_on_deserialize() {
        let result: std::result::Result<Amount, _> =
            serde_json::from_str(r#"{"currency": "euro", "value": "1.00"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_add() {
        let a = Amount::new(eur(), dec!(5.00)).unwrap();
        let b = Amount::new(eur(), dec!(2.50)).unwrap();
        assert_eq!(a.checked_add(&b).unwrap().value, dec!(7.50));

        let usd = Amount::new(Currency::new("USD").unwrap(), dec!(1.00)).unwrap();
        assert!(matches!(
            a.checked_add(&usd),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Amount::new(eur(), Decimal::MAX).unwrap();
        assert!(matches!(
            max.checked_add(&max),
            Err(GatewayError::ValidationError(_))
        ));
        assert_eq!(
            Amount::zero(eur()).checked_add(&max).unwrap().value,
            Decimal::MAX
        );
    }
}
