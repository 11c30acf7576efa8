//! Transaction recording and booking creation
//!
//! A booking is one transaction row per service selection set: the priced
//! total, a generated order id, and the Snap session handle. Status moves
//! only through the notification handler or the expiry worker.

use sqlx::PgPool;
use temanly_shared::TransactionStatus;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::is_known_service;
use crate::eligibility::{has_restricted_services, service_restrictions};
use crate::error::{BookingError, BookingResult};
use crate::events::{ActorType, BookingEventBuilder, BookingEventLogger, BookingEventType};
use crate::midtrans::{MidtransClient, SnapCustomer};
use crate::pricing::{calculate_total_price, ServiceSelection};

/// Stored transaction row.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub order_id: String,
    pub user_id: Uuid,
    pub talent_id: Uuid,
    pub service_id: String,
    pub duration: i32,
    pub duration_unit: String,
    /// Gross amount in whole rupiah
    pub amount: i64,
    pub status: String,
    pub payment_type: Option<String>,
    pub snap_token: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

/// A booking request: who books whom, for which single service selection.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: Uuid,
    pub talent_id: Uuid,
    pub selection: ServiceSelection,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
}

/// Result of creating a booking: the stored row plus the Snap handle the
/// frontend needs to open the payment popup.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedBooking {
    pub transaction: Transaction,
    pub snap_token: String,
    pub redirect_url: String,
}

/// Transaction service: creation, status transitions, queries.
pub struct TransactionService {
    midtrans: MidtransClient,
    pool: PgPool,
    event_logger: BookingEventLogger,
}

impl TransactionService {
    pub fn new(midtrans: MidtransClient, pool: PgPool) -> Self {
        let event_logger = BookingEventLogger::new(pool.clone());
        Self {
            midtrans,
            pool,
            event_logger,
        }
    }

    /// Create a booking: eligibility gate, price, insert, Snap session.
    ///
    /// The pricing engine itself prices unknown ids at zero; this boundary
    /// rejects them first so a zero-amount session can never be created.
    pub async fn create_booking(
        &self,
        request: &BookingRequest,
        is_verified: bool,
    ) -> BookingResult<CreatedBooking> {
        let selection = &request.selection;

        if !is_known_service(&selection.id) {
            return Err(BookingError::InvalidInput(format!(
                "Unknown service id '{}'",
                selection.id
            )));
        }
        if selection.duration == 0 {
            return Err(BookingError::InvalidInput(
                "Duration must be positive".to_string(),
            ));
        }

        let selections = std::slice::from_ref(selection);
        if has_restricted_services(selections, is_verified) {
            return Err(BookingError::VerificationRequired(service_restrictions(
                is_verified,
            )));
        }

        let amount = calculate_total_price(selections);
        let order_id = format!("TMN-{}", Uuid::new_v4());

        let transaction: Transaction = sqlx::query_as(
            r#"
            INSERT INTO transactions (
                order_id, user_id, talent_id, service_id, duration, duration_unit,
                amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING id, order_id, user_id, talent_id, service_id, duration,
                      duration_unit, amount, status, payment_type, snap_token,
                      created_at, updated_at, paid_at
            "#,
        )
        .bind(&order_id)
        .bind(request.user_id)
        .bind(request.talent_id)
        .bind(&selection.id)
        .bind(selection.duration as i32)
        .bind(selection.unit.as_str())
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        let customer = SnapCustomer {
            first_name: request.customer_name.clone(),
            email: request.customer_email.clone(),
            phone: request.customer_phone.clone(),
        };

        let session = self
            .midtrans
            .create_snap_transaction(&order_id, amount, &customer)
            .await?;

        sqlx::query("UPDATE transactions SET snap_token = $1, updated_at = NOW() WHERE id = $2")
            .bind(&session.token)
            .bind(transaction.id)
            .execute(&self.pool)
            .await?;

        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(BookingEventType::BookingCreated)
                    .user(request.user_id)
                    .order(&order_id)
                    .actor_type(ActorType::User)
                    .data(serde_json::json!({
                        "service_id": selection.id,
                        "duration": selection.duration,
                        "duration_unit": selection.unit.as_str(),
                        "amount": amount,
                    })),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to log booking created event");
        }

        tracing::info!(
            order_id = %order_id,
            user_id = %request.user_id,
            talent_id = %request.talent_id,
            service_id = %selection.id,
            amount = amount,
            "Booking created"
        );

        Ok(CreatedBooking {
            snap_token: session.token.clone(),
            redirect_url: session.redirect_url,
            transaction: Transaction {
                snap_token: Some(session.token),
                ..transaction
            },
        })
    }

    /// Transition a transaction's status, refusing to leave terminal states.
    ///
    /// Returns the updated row, or `None` when the transition was a no-op
    /// (already in the requested or a terminal state).
    pub async fn mark_status(
        &self,
        order_id: &str,
        status: TransactionStatus,
        payment_type: Option<&str>,
    ) -> BookingResult<Option<Transaction>> {
        let paid_at = if status == TransactionStatus::Paid {
            Some(OffsetDateTime::now_utc())
        } else {
            None
        };

        let updated: Option<Transaction> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET status = $1,
                payment_type = COALESCE($2, payment_type),
                paid_at = COALESCE($3, paid_at),
                updated_at = NOW()
            WHERE order_id = $4
              AND status = 'pending'
            RETURNING id, order_id, user_id, talent_id, service_id, duration,
                      duration_unit, amount, status, payment_type, snap_token,
                      created_at, updated_at, paid_at
            "#,
        )
        .bind(status.as_str())
        .bind(payment_type)
        .bind(paid_at)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        if updated.is_none() {
            tracing::debug!(
                order_id = %order_id,
                requested_status = %status,
                "Status transition skipped (not pending)"
            );
        }

        Ok(updated)
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> BookingResult<Transaction> {
        let row: Option<Transaction> = sqlx::query_as(
            r#"
            SELECT id, order_id, user_id, talent_id, service_id, duration,
                   duration_unit, amount, status, payment_type, snap_token,
                   created_at, updated_at, paid_at
            FROM transactions
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| BookingError::TransactionNotFound(order_id.to_string()))
    }

    /// Transactions for one user, newest first.
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> BookingResult<Vec<Transaction>> {
        let rows: Vec<Transaction> = sqlx::query_as(
            r#"
            SELECT id, order_id, user_id, talent_id, service_id, duration,
                   duration_unit, amount, status, payment_type, snap_token,
                   created_at, updated_at, paid_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Expire pending transactions older than `max_age_hours`.
    ///
    /// Run by the worker; returns how many rows were expired.
    pub async fn expire_stale_pending(&self, max_age_hours: i64) -> BookingResult<u64> {
        let expired: Vec<(String, Uuid)> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'pending'
              AND created_at < NOW() - ($1 || ' hours')::INTERVAL
            RETURNING order_id, user_id
            "#,
        )
        .bind(max_age_hours.to_string())
        .fetch_all(&self.pool)
        .await?;

        for (order_id, user_id) in &expired {
            if let Err(e) = self
                .event_logger
                .log_event(
                    BookingEventBuilder::new(BookingEventType::PaymentExpired)
                        .user(*user_id)
                        .order(order_id.clone())
                        .actor_type(ActorType::System),
                )
                .await
            {
                tracing::warn!(order_id = %order_id, error = %e, "Failed to log expiry event");
            }
        }

        Ok(expired.len() as u64)
    }
}
