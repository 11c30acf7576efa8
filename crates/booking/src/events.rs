//! Booking event audit trail
//!
//! Append-only log of notable state changes: bookings created, payments
//! settled, verifications decided. Logging is best-effort at call sites
//! (a failed audit insert is warned about, never propagated), so the
//! logger itself returns errors and lets callers decide.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};

/// Who caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    User,
    Admin,
    Midtrans,
    System,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::Admin => "admin",
            ActorType::Midtrans => "midtrans",
            ActorType::System => "system",
        }
    }
}

/// Event categories recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEventType {
    BookingCreated,
    PaymentSettled,
    PaymentFailed,
    PaymentExpired,
    PaymentRefunded,
    VerificationSubmitted,
    VerificationApproved,
    VerificationRejected,
    CodeIssued,
    CodeConfirmed,
}

impl BookingEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingEventType::BookingCreated => "BOOKING_CREATED",
            BookingEventType::PaymentSettled => "PAYMENT_SETTLED",
            BookingEventType::PaymentFailed => "PAYMENT_FAILED",
            BookingEventType::PaymentExpired => "PAYMENT_EXPIRED",
            BookingEventType::PaymentRefunded => "PAYMENT_REFUNDED",
            BookingEventType::VerificationSubmitted => "VERIFICATION_SUBMITTED",
            BookingEventType::VerificationApproved => "VERIFICATION_APPROVED",
            BookingEventType::VerificationRejected => "VERIFICATION_REJECTED",
            BookingEventType::CodeIssued => "CODE_ISSUED",
            BookingEventType::CodeConfirmed => "CODE_CONFIRMED",
        }
    }
}

/// Builder for one audit event.
pub struct BookingEventBuilder {
    event_type: BookingEventType,
    user_id: Option<Uuid>,
    order_id: Option<String>,
    actor_type: ActorType,
    data: serde_json::Value,
}

impl BookingEventBuilder {
    pub fn new(event_type: BookingEventType) -> Self {
        Self {
            event_type,
            user_id: None,
            order_id: None,
            actor_type: ActorType::System,
            data: serde_json::Value::Null,
        }
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn actor_type(mut self, actor: ActorType) -> Self {
        self.actor_type = actor;
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Writes audit events to `booking_events`.
#[derive(Clone)]
pub struct BookingEventLogger {
    pool: PgPool,
}

impl BookingEventLogger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log_event(&self, builder: BookingEventBuilder) -> BookingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO booking_events (user_id, order_id, event_type, actor_type, event_data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(builder.user_id)
        .bind(builder.order_id.as_deref())
        .bind(builder.event_type.as_str())
        .bind(builder.actor_type.as_str())
        .bind(&builder.data)
        .execute(&self.pool)
        .await
        .map_err(|e| BookingError::Database(e.to_string()))?;

        Ok(())
    }
}
