//! User and talent verification
//!
//! Verification has three factors: an identity document approved by an
//! admin, a confirmed email address, and a confirmed WhatsApp number.
//! `is_verified` is true only when all three hold; the eligibility gate
//! consumes that single boolean.

use rand::Rng;
use sqlx::PgPool;
use temanly_shared::{VerificationChannel, VerificationStatus};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::events::{ActorType, BookingEventBuilder, BookingEventLogger, BookingEventType};

/// Verification codes expire after this long.
const CODE_TTL_MINUTES: i64 = 10;

/// Stored verification record for one user.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct VerificationRecord {
    pub user_id: Uuid,
    pub id_document_url: Option<String>,
    pub status: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub reviewed_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub rejection_reason: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl VerificationRecord {
    /// Document approved AND email confirmed AND phone confirmed.
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Approved.as_str()
            && self.email_verified
            && self.phone_verified
    }
}

/// Summary row for the admin review queue.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct PendingVerification {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub id_document_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

/// Verification service: document lifecycle, OTP codes, admin decisions.
pub struct VerificationService {
    pool: PgPool,
    event_logger: BookingEventLogger,
}

impl VerificationService {
    pub fn new(pool: PgPool) -> Self {
        let event_logger = BookingEventLogger::new(pool.clone());
        Self { pool, event_logger }
    }

    /// Submit (or resubmit) an identity document. Resubmission after a
    /// rejection resets the record to pending review.
    pub async fn submit_id_document(
        &self,
        user_id: Uuid,
        document_url: &str,
    ) -> BookingResult<VerificationRecord> {
        if document_url.is_empty() {
            return Err(BookingError::InvalidInput(
                "Document URL must not be empty".to_string(),
            ));
        }

        let record: VerificationRecord = sqlx::query_as(
            r#"
            INSERT INTO user_verifications (user_id, id_document_url, status)
            VALUES ($1, $2, 'pending')
            ON CONFLICT (user_id) DO UPDATE SET
                id_document_url = EXCLUDED.id_document_url,
                status = 'pending',
                reviewed_by = NULL,
                reviewed_at = NULL,
                rejection_reason = NULL,
                updated_at = NOW()
            RETURNING user_id, id_document_url, status, email_verified, phone_verified,
                      reviewed_by, reviewed_at, rejection_reason, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(document_url)
        .fetch_one(&self.pool)
        .await?;

        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(BookingEventType::VerificationSubmitted)
                    .user(user_id)
                    .actor_type(ActorType::User),
            )
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to log verification submission");
        }

        tracing::info!(user_id = %user_id, "Identity document submitted for review");
        Ok(record)
    }

    /// Current verification record; a default unsubmitted view when the
    /// user has never started verification.
    pub async fn get_record(&self, user_id: Uuid) -> BookingResult<VerificationRecord> {
        let record: Option<VerificationRecord> = sqlx::query_as(
            r#"
            SELECT user_id, id_document_url, status, email_verified, phone_verified,
                   reviewed_by, reviewed_at, rejection_reason, created_at, updated_at
            FROM user_verifications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.unwrap_or_else(|| {
            let now = OffsetDateTime::now_utc();
            VerificationRecord {
                user_id,
                id_document_url: None,
                status: VerificationStatus::Unsubmitted.as_str().to_string(),
                email_verified: false,
                phone_verified: false,
                reviewed_by: None,
                reviewed_at: None,
                rejection_reason: None,
                created_at: now,
                updated_at: now,
            }
        }))
    }

    /// Whether the user clears the eligibility gate.
    pub async fn is_verified(&self, user_id: Uuid) -> BookingResult<bool> {
        Ok(self.get_record(user_id).await?.is_verified())
    }

    /// Issue a fresh verification code for a channel, invalidating any
    /// previous unconsumed codes for the same channel. Returns the code for
    /// the caller to dispatch.
    pub async fn issue_code(
        &self,
        user_id: Uuid,
        channel: VerificationChannel,
    ) -> BookingResult<String> {
        let code = generate_code();
        let expires_at = OffsetDateTime::now_utc() + Duration::minutes(CODE_TTL_MINUTES);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE verification_codes
            SET consumed_at = NOW()
            WHERE user_id = $1 AND channel = $2 AND consumed_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(channel.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO verification_codes (user_id, channel, code, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(channel.as_str())
        .bind(&code)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(BookingEventType::CodeIssued)
                    .user(user_id)
                    .actor_type(ActorType::System)
                    .data(serde_json::json!({ "channel": channel.as_str() })),
            )
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to log code issuance");
        }

        tracing::info!(user_id = %user_id, channel = %channel, "Verification code issued");
        Ok(code)
    }

    /// Confirm a code. Consumes it on success and flips the channel's
    /// verified flag on the user's record.
    pub async fn confirm_code(
        &self,
        user_id: Uuid,
        channel: VerificationChannel,
        code: &str,
    ) -> BookingResult<()> {
        let row: Option<(Uuid, OffsetDateTime)> = sqlx::query_as(
            r#"
            SELECT id, expires_at
            FROM verification_codes
            WHERE user_id = $1 AND channel = $2 AND code = $3 AND consumed_at IS NULL
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(channel.as_str())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        let (code_id, expires_at) = row.ok_or(BookingError::CodeInvalid)?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(BookingError::CodeExpired);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE verification_codes SET consumed_at = NOW() WHERE id = $1")
            .bind(code_id)
            .execute(&mut *tx)
            .await?;

        let column = match channel {
            VerificationChannel::Email => "email_verified",
            VerificationChannel::Whatsapp => "phone_verified",
        };
        // Column name comes from the enum above, never from input.
        let sql = format!(
            r#"
            INSERT INTO user_verifications (user_id, status, {column})
            VALUES ($1, 'unsubmitted', TRUE)
            ON CONFLICT (user_id) DO UPDATE SET {column} = TRUE, updated_at = NOW()
            "#
        );
        sqlx::query(&sql).bind(user_id).execute(&mut *tx).await?;

        tx.commit().await?;

        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(BookingEventType::CodeConfirmed)
                    .user(user_id)
                    .actor_type(ActorType::User)
                    .data(serde_json::json!({ "channel": channel.as_str() })),
            )
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to log code confirmation");
        }

        tracing::info!(user_id = %user_id, channel = %channel, "Verification code confirmed");
        Ok(())
    }

    /// Users awaiting document review, oldest submission first.
    pub async fn list_pending(&self, limit: i64) -> BookingResult<Vec<PendingVerification>> {
        let rows: Vec<PendingVerification> = sqlx::query_as(
            r#"
            SELECT v.user_id, u.email, u.display_name, v.id_document_url,
                   v.updated_at AS submitted_at
            FROM user_verifications v
            JOIN users u ON u.id = v.user_id
            WHERE v.status = 'pending'
            ORDER BY v.updated_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 200))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Approve a pending document.
    pub async fn approve(&self, user_id: Uuid, admin_id: Uuid) -> BookingResult<()> {
        self.decide(user_id, admin_id, VerificationStatus::Approved, None)
            .await
    }

    /// Reject a pending document. A reason is mandatory; it is shown to
    /// the user on their dashboard.
    pub async fn reject(&self, user_id: Uuid, admin_id: Uuid, reason: &str) -> BookingResult<()> {
        if reason.trim().is_empty() {
            return Err(BookingError::InvalidInput(
                "Rejection reason must not be empty".to_string(),
            ));
        }
        self.decide(user_id, admin_id, VerificationStatus::Rejected, Some(reason))
            .await
    }

    async fn decide(
        &self,
        user_id: Uuid,
        admin_id: Uuid,
        decision: VerificationStatus,
        reason: Option<&str>,
    ) -> BookingResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE user_verifications
            SET status = $1, reviewed_by = $2, reviewed_at = NOW(),
                rejection_reason = $3, updated_at = NOW()
            WHERE user_id = $4 AND status = 'pending'
            "#,
        )
        .bind(decision.as_str())
        .bind(admin_id)
        .bind(reason)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(BookingError::NotFound(format!(
                "No pending verification for user {}",
                user_id
            )));
        }

        let event_type = if decision == VerificationStatus::Approved {
            BookingEventType::VerificationApproved
        } else {
            BookingEventType::VerificationRejected
        };
        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(event_type)
                    .user(user_id)
                    .actor_type(ActorType::Admin)
                    .data(serde_json::json!({
                        "admin_id": admin_id,
                        "reason": reason,
                    })),
            )
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to log verification decision");
        }

        tracing::info!(
            user_id = %user_id,
            admin_id = %admin_id,
            decision = %decision,
            "Verification decision recorded"
        );
        Ok(())
    }

    /// Purge consumed and long-expired codes. Run daily by the worker.
    pub async fn purge_stale_codes(&self) -> BookingResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_codes
            WHERE consumed_at IS NOT NULL
               OR expires_at < NOW() - INTERVAL '1 day'
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Six random digits, zero-padded.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}
