//! Midtrans payment notification handling
//!
//! Midtrans delivers transaction status changes as HTTP POSTs. Each
//! notification carries a `signature_key`: the SHA-512 of
//! `order_id + status_code + gross_amount + server_key`. Verification
//! happens before any field of the payload is trusted.
//!
//! Midtrans redelivers notifications on timeout and on manual resend from
//! the dashboard, so processing claims an idempotency row per
//! `(order_id, transaction_status)` before touching the transaction.

use serde::Deserialize;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use temanly_shared::TransactionStatus;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::events::{ActorType, BookingEventBuilder, BookingEventLogger, BookingEventType};
use crate::midtrans::MidtransClient;
use crate::transactions::TransactionService;

/// Payload of a Midtrans HTTP notification. Fields beyond these exist but
/// are not needed for settlement bookkeeping.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

/// What a notification did to the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Status transition applied
    Applied(TransactionStatus),
    /// Same `(order_id, status)` already processed
    Duplicate,
    /// Verified but carried a status we deliberately ignore
    Ignored(String),
}

/// Map a Midtrans `transaction_status` (plus `fraud_status`) onto our
/// transaction lifecycle. Returns `None` for states that are verified but
/// not acted on (`pending`, `capture`+`challenge`, unknown states).
pub fn map_transaction_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> Option<TransactionStatus> {
    match transaction_status {
        // capture settles only once fraud review accepts; "challenge"
        // stays pending until a follow-up notification resolves it.
        "capture" => match fraud_status {
            Some("accept") | None => Some(TransactionStatus::Paid),
            _ => None,
        },
        "settlement" => Some(TransactionStatus::Paid),
        "deny" | "cancel" => Some(TransactionStatus::Failed),
        "expire" => Some(TransactionStatus::Expired),
        "refund" | "partial_refund" => Some(TransactionStatus::Refunded),
        _ => None,
    }
}

/// Handler for Midtrans payment notifications.
pub struct WebhookHandler {
    midtrans: MidtransClient,
    pool: PgPool,
    event_logger: BookingEventLogger,
}

impl WebhookHandler {
    pub fn new(midtrans: MidtransClient, pool: PgPool) -> Self {
        let event_logger = BookingEventLogger::new(pool.clone());
        Self {
            midtrans,
            pool,
            event_logger,
        }
    }

    /// Verify a notification's signature against the configured server key.
    pub fn verify_signature(&self, notification: &PaymentNotification) -> BookingResult<()> {
        verify_notification_signature(notification, &self.midtrans.config().server_key)
    }

    /// Handle a verified notification.
    ///
    /// The idempotency claim is an atomic INSERT ... ON CONFLICT DO NOTHING:
    /// only one concurrent delivery of a given `(order_id, status)` pair
    /// obtains the returned row and performs side effects; the rest see a
    /// duplicate and return Ok.
    pub async fn handle_notification(
        &self,
        notification: &PaymentNotification,
        transactions: &TransactionService,
    ) -> BookingResult<NotificationOutcome> {
        self.verify_signature(notification)?;

        let claimed: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO payment_notifications (order_id, transaction_status, processing_result)
            VALUES ($1, $2, 'processing')
            ON CONFLICT (order_id, transaction_status) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&notification.order_id)
        .bind(&notification.transaction_status)
        .fetch_optional(&self.pool)
        .await?;

        let Some((claim_id,)) = claimed else {
            tracing::info!(
                order_id = %notification.order_id,
                transaction_status = %notification.transaction_status,
                "Duplicate payment notification - already claimed"
            );
            return Ok(NotificationOutcome::Duplicate);
        };

        let result = self.process_claimed(notification, transactions).await;

        let (processing_result, error_message) = match &result {
            Ok(_) => ("success", None),
            Err(e) => ("error", Some(e.to_string())),
        };
        if let Err(e) = sqlx::query(
            "UPDATE payment_notifications SET processing_result = $1, error_message = $2 WHERE id = $3",
        )
        .bind(processing_result)
        .bind(error_message.as_deref())
        .bind(claim_id)
        .execute(&self.pool)
        .await
        {
            tracing::error!(
                order_id = %notification.order_id,
                error = %e,
                "Failed to update notification audit record"
            );
        }

        result
    }

    async fn process_claimed(
        &self,
        notification: &PaymentNotification,
        transactions: &TransactionService,
    ) -> BookingResult<NotificationOutcome> {
        let Some(new_status) = map_transaction_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        ) else {
            tracing::info!(
                order_id = %notification.order_id,
                transaction_status = %notification.transaction_status,
                fraud_status = ?notification.fraud_status,
                "Payment notification carries no actionable status"
            );
            return Ok(NotificationOutcome::Ignored(
                notification.transaction_status.clone(),
            ));
        };

        let updated = transactions
            .mark_status(
                &notification.order_id,
                new_status,
                notification.payment_type.as_deref(),
            )
            .await?;

        let Some(transaction) = updated else {
            // Row missing or already terminal; either way there is nothing
            // further to apply for this delivery.
            return Ok(NotificationOutcome::Ignored(
                notification.transaction_status.clone(),
            ));
        };

        let event_type = match new_status {
            TransactionStatus::Paid => BookingEventType::PaymentSettled,
            TransactionStatus::Failed => BookingEventType::PaymentFailed,
            TransactionStatus::Expired => BookingEventType::PaymentExpired,
            TransactionStatus::Refunded => BookingEventType::PaymentRefunded,
            // map_transaction_status never yields Pending
            TransactionStatus::Pending => {
                return Ok(NotificationOutcome::Applied(new_status));
            }
        };

        if let Err(e) = self
            .event_logger
            .log_event(
                BookingEventBuilder::new(event_type)
                    .user(transaction.user_id)
                    .order(&notification.order_id)
                    .actor_type(ActorType::Midtrans)
                    .data(serde_json::json!({
                        "transaction_status": notification.transaction_status,
                        "payment_type": notification.payment_type,
                        "gross_amount": notification.gross_amount,
                    })),
            )
            .await
        {
            tracing::warn!(
                order_id = %notification.order_id,
                error = %e,
                "Failed to log payment event"
            );
        }

        tracing::info!(
            order_id = %notification.order_id,
            status = %new_status,
            payment_type = ?notification.payment_type,
            "Payment notification applied"
        );

        Ok(NotificationOutcome::Applied(new_status))
    }
}

/// Compute the expected `signature_key` for a notification.
pub fn compute_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time check of a notification's `signature_key`.
///
/// Midtrans sends lowercase hex but the comparison tolerates case so a
/// proxy that normalizes casing cannot break settlement.
pub fn verify_notification_signature(
    notification: &PaymentNotification,
    server_key: &str,
) -> BookingResult<()> {
    if server_key.is_empty() {
        return Err(BookingError::NotConfigured(
            "Midtrans server key missing - cannot verify notifications".to_string(),
        ));
    }

    let expected = compute_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
    );
    let received = notification.signature_key.to_lowercase();

    if expected.as_bytes().ct_eq(received.as_bytes()).into() {
        Ok(())
    } else {
        tracing::warn!(
            order_id = %notification.order_id,
            "Payment notification signature mismatch"
        );
        Err(BookingError::NotificationSignatureInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_KEY: &str = "SB-Mid-server-testkey";

    fn signed_notification(transaction_status: &str) -> PaymentNotification {
        let order_id = "TMN-test-1";
        let status_code = "200";
        let gross_amount = "570000.00";
        PaymentNotification {
            order_id: order_id.to_string(),
            status_code: status_code.to_string(),
            gross_amount: gross_amount.to_string(),
            signature_key: compute_signature(order_id, status_code, gross_amount, SERVER_KEY),
            transaction_status: transaction_status.to_string(),
            fraud_status: None,
            payment_type: Some("gopay".to_string()),
        }
    }

    #[test]
    fn valid_signature_accepted() {
        let notification = signed_notification("settlement");
        assert!(verify_notification_signature(&notification, SERVER_KEY).is_ok());
    }

    #[test]
    fn uppercase_signature_accepted() {
        let mut notification = signed_notification("settlement");
        notification.signature_key = notification.signature_key.to_uppercase();
        assert!(verify_notification_signature(&notification, SERVER_KEY).is_ok());
    }

    #[test]
    fn tampered_amount_rejected() {
        let mut notification = signed_notification("settlement");
        notification.gross_amount = "1.00".to_string();
        assert!(matches!(
            verify_notification_signature(&notification, SERVER_KEY),
            Err(BookingError::NotificationSignatureInvalid)
        ));
    }

    #[test]
    fn wrong_server_key_rejected() {
        let notification = signed_notification("settlement");
        assert!(verify_notification_signature(&notification, "other-key").is_err());
    }

    #[test]
    fn missing_server_key_is_config_error() {
        let notification = signed_notification("settlement");
        assert!(matches!(
            verify_notification_signature(&notification, ""),
            Err(BookingError::NotConfigured(_))
        ));
    }

    #[test]
    fn settlement_maps_to_paid() {
        assert_eq!(
            map_transaction_status("settlement", None),
            Some(TransactionStatus::Paid)
        );
    }

    #[test]
    fn capture_requires_fraud_accept() {
        assert_eq!(
            map_transaction_status("capture", Some("accept")),
            Some(TransactionStatus::Paid)
        );
        assert_eq!(map_transaction_status("capture", Some("challenge")), None);
    }

    #[test]
    fn failure_states_map_to_failed() {
        assert_eq!(
            map_transaction_status("deny", None),
            Some(TransactionStatus::Failed)
        );
        assert_eq!(
            map_transaction_status("cancel", None),
            Some(TransactionStatus::Failed)
        );
    }

    #[test]
    fn expiry_and_refunds() {
        assert_eq!(
            map_transaction_status("expire", None),
            Some(TransactionStatus::Expired)
        );
        assert_eq!(
            map_transaction_status("refund", None),
            Some(TransactionStatus::Refunded)
        );
        assert_eq!(
            map_transaction_status("partial_refund", None),
            Some(TransactionStatus::Refunded)
        );
    }

    #[test]
    fn unknown_states_are_ignored_not_errors() {
        assert_eq!(map_transaction_status("pending", None), None);
        assert_eq!(map_transaction_status("authorize", None), None);
        assert_eq!(map_transaction_status("", None), None);
    }
}
