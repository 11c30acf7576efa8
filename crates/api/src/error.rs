//! API error type and HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use temanly_booking::BookingError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Unverified user attempted a restricted booking; carries the
    /// restricted display names for the verification call-to-action.
    #[error("Verification required")]
    VerificationRequired(Vec<&'static str>),

    #[error("Not found")]
    NotFound,

    #[error("Invalid payment notification signature")]
    SignatureInvalid,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "bad_request", "message": msg }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "unauthorized" }),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "forbidden" })),
            ApiError::VerificationRequired(names) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "verification_required",
                    "restricted_services": names,
                }),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "not_found" })),
            ApiError::SignatureInvalid => (
                StatusCode::FORBIDDEN,
                json!({ "error": "signature_invalid" }),
            ),
            ApiError::Config(_) | ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        ApiError::Internal
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::VerificationRequired(names) => ApiError::VerificationRequired(names),
            BookingError::InvalidInput(msg) => ApiError::BadRequest(msg),
            BookingError::NotificationSignatureInvalid => ApiError::SignatureInvalid,
            BookingError::CodeInvalid | BookingError::CodeExpired => {
                ApiError::BadRequest(e.to_string())
            }
            BookingError::TransactionNotFound(_) | BookingError::NotFound(_) => ApiError::NotFound,
            BookingError::UnsupportedNotification(msg) => ApiError::BadRequest(msg),
            BookingError::Database(msg) => {
                tracing::error!(error = %msg, "Booking database error");
                ApiError::Internal
            }
            BookingError::MidtransApi(msg) => {
                tracing::error!(error = %msg, "Midtrans error");
                ApiError::Internal
            }
            BookingError::NotConfigured(msg) => {
                tracing::error!(error = %msg, "Service not configured");
                ApiError::Internal
            }
            BookingError::Internal(msg) => {
                tracing::error!(error = %msg, "Booking internal error");
                ApiError::Internal
            }
        }
    }
}
