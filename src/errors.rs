use thiserror::Error;
use uuid::Uuid;

/// Unified error type for domain, service, and storage layers.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("No book found for user {0}")]
    BookNotFound(Uuid),
    #[error("Recurring rule not found: {0}")]
    RuleNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),
    #[error("Payment method not found: {0}")]
    PaymentMethodNotFound(Uuid),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown frequency `{0}`")]
    UnknownFrequency(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}
