//! Payment Error Types

use axum::http::{Method, StatusCode};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Every failure a handler can map to a response.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Missing or empty client input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Webhook authenticity check failed
    #[error("{0}")]
    Signature(String),

    /// Request body could not be read
    #[error("{0}")]
    Parse(String),

    /// No payment record for the given processor id
    #[error("Payment not found: {0}")]
    NotFound(String),

    /// Processor rejected the call or could not be reached
    #[error("Processor error: {0}")]
    Processor(String),

    /// Store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Confirmation email could not be sent
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// HTTP status for this error kind
    pub fn status(&self) -> StatusCode {
        match self {
            PaymentError::Validation(_)
            | PaymentError::Signature(_)
            | PaymentError::Parse(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PaymentError::Processor(_)
            | PaymentError::Persistence(_)
            | PaymentError::Notification(_)
            | PaymentError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client caused this and resending unchanged won't help
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<redis::RedisError> for PaymentError {
    fn from(err: redis::RedisError) -> Self {
        PaymentError::Persistence(err.to_string())
    }
}
