//! Booking crate error taxonomy

use thiserror::Error;

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Midtrans API error: {0}")]
    MidtransApi(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Payment notification signature invalid")]
    NotificationSignatureInvalid,

    #[error("Unsupported payment notification: {0}")]
    UnsupportedNotification(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Carries the display names of the restricted services the user tried
    /// to book, for rendering in the verification call-to-action.
    #[error("Account verification required for: {}", .0.join(", "))]
    VerificationRequired(Vec<&'static str>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Verification code invalid")]
    CodeInvalid,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        BookingError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(e: reqwest::Error) -> Self {
        BookingError::MidtransApi(e.to_string())
    }
}
