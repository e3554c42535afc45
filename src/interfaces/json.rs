use crate::domain::method::{MethodsResponse, PaymentMethod};
use crate::domain::order::Order;
use crate::error::Result;
use std::io::{Read, Write};

/// Reads a JSON array of orders (with their payments) and validates each one.
pub fn load_orders<R: Read>(source: R) -> Result<Vec<Order>> {
    let orders: Vec<Order> = serde_json::from_reader(source)?;
    for order in &orders {
        order.validate()?;
    }
    Ok(orders)
}

/// Reads a provider methods response, enveloped or bare.
pub fn load_methods<R: Read>(source: R) -> Result<Vec<PaymentMethod>> {
    let response: MethodsResponse = serde_json::from_reader(source)?;
    Ok(response.into_methods())
}

pub fn write_methods<W: Write>(mut sink: W, methods: &[PaymentMethod]) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, methods)?;
    writeln!(sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderState;
    use crate::error::GatewayError;

    #[test]
    fn test_load_orders() {
        let json = r#"[{
            "number": "R1",
            "total": {"currency": "EUR", "value": "10.00"},
            "state": "confirm",
            "payments": [
                {"id": "P1", "order_id": "R1", "amount": {"currency": "EUR", "value": "10.00"}, "state": "processing"}
            ]
        }]"#;
        let orders = load_orders(json.as_bytes()).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].state(), OrderState::Confirm);
    }

    #[test]
    fn test_load_orders_rejects_currency_mismatch() {
        let json = r#"[{
            "number": "R1",
            "total": {"currency": "EUR", "value": "10.00"},
            "payments": [
                {"id": "P1", "order_id": "R1", "amount": {"currency": "USD", "value": "10.00"}}
            ]
        }]"#;
        assert!(matches!(
            load_orders(json.as_bytes()),
            Err(GatewayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_orders_malformed() {
        assert!(matches!(
            load_orders("[{".as_bytes()),
            Err(GatewayError::JsonError(_))
        ));
    }

    #[test]
    fn test_methods_response_passes_through_unchanged() {
        let json = r#"[
            {
                "resource": "method",
                "id": "ideal",
                "description": "iDEAL",
                "minimumAmount": {"value": "0.01", "currency": "EUR"},
                "maximumAmount": {"value": "50000.00", "currency": "EUR"},
                "image": {
                    "size1x": "https://www.mollie.com/external/icons/payment-methods/ideal.png",
                    "size2x": "https://www.mollie.com/external/icons/payment-methods/ideal%402x.png",
                    "svg": "https://www.mollie.com/external/icons/payment-methods/ideal.svg"
                },
                "issuers": [
                    {
                        "resource": "issuer",
                        "id": "ideal_ABNANL2A",
                        "name": "ABN AMRO",
                        "image": {
                            "size1x": "https://www.mollie.com/external/icons/ideal-issuers/ABNANL2A.png",
                            "size2x": "https://www.mollie.com/external/icons/ideal-issuers/ABNANL2A%402x.png",
                            "svg": "https://www.mollie.com/external/icons/ideal-issuers/ABNANL2A.svg"
                        }
                    }
                ],
                "pricing": [
                    {"description": "Netherlands", "fixed": {"value": "0.29", "currency": "EUR"}, "variable": "0"}
                ],
                "status": "activated",
                "_links": {
                    "self": {"href": "https://api.mollie.com/v2/methods/ideal", "type": "application/hal+json"}
                }
            },
            {"resource": "method", "id": "creditcard", "description": "Credit card", "issuers": []}
        ]"#;
        let methods = load_methods(json.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_methods(&mut buffer, &methods).unwrap();
        let output: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let input: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(output, input);
    }
}
