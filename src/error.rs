use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unsupported provider status: {0}")]
    UnsupportedStatus(String),
    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Cannot fire '{event}' on {entity} in state '{from}'")]
    InvalidTransition {
        entity: &'static str,
        event: String,
        from: String,
    },
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for GatewayError {
    fn from(err: rocksdb::Error) -> Self {
        GatewayError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
