//! Midtrans payment notification endpoint

use axum::extract::State;
use axum::Json;
use serde_json::json;

use temanly_booking::{NotificationOutcome, PaymentNotification};

use crate::error::ApiResult;
use crate::state::AppState;

/// Receive a Midtrans HTTP notification.
///
/// Midtrans retries on any non-2xx response, so signature failures return
/// 403 (retries are useless) while transient processing errors surface as
/// 500 and get redelivered.
pub async fn notification(
    State(state): State<AppState>,
    Json(body): Json<PaymentNotification>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = state
        .booking
        .webhooks
        .handle_notification(&body, &state.booking.transactions)
        .await?;

    let status = match outcome {
        NotificationOutcome::Applied(status) => {
            json!({ "status": "ok", "applied": status.as_str() })
        }
        NotificationOutcome::Duplicate => json!({ "status": "ok", "duplicate": true }),
        NotificationOutcome::Ignored(s) => json!({ "status": "ok", "ignored": s }),
    };

    Ok(Json(status))
}
