use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// Writes a single order at `confirm` with one processing payment of `value` EUR.
pub fn single_order(number: &str, payment: &str, value: &str) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"[{{
            "number": "{number}",
            "total": {{"currency": "EUR", "value": "{value}"}},
            "state": "confirm",
            "payments": [{{
                "id": "{payment}",
                "order_id": "{number}",
                "amount": {{"currency": "EUR", "value": "{value}"}},
                "state": "processing"
            }}]
        }}]"#
    )?;
    file.flush()?;
    Ok(file)
}

/// Writes a notifications CSV with the given `(payment, status)` rows.
pub fn notifications(rows: &[(&str, &str)]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    let mut wtr = csv::Writer::from_writer(file.as_file_mut());
    wtr.write_record(["payment", "status", "refunded_currency", "refunded_value"])?;
    for (payment, status) in rows {
        wtr.write_record([*payment, *status, "", ""])?;
    }
    wtr.flush()?;
    drop(wtr);
    Ok(file)
}
