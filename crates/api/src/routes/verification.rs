//! User verification routes: documents, OTP codes, status

use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use temanly_booking::{service_restrictions, VerificationRecord};
use temanly_shared::VerificationChannel;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitDocumentBody {
    pub document_url: String,
}

/// Submit an identity document for admin review.
pub async fn submit_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SubmitDocumentBody>,
) -> ApiResult<Json<VerificationRecord>> {
    let record = state
        .booking
        .verification
        .submit_id_document(auth_user.user_id, &body.document_url)
        .await?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct SendCodeBody {
    pub channel: String,
    /// Required for WhatsApp sends; email uses the token's address.
    pub phone: Option<String>,
}

/// Issue and dispatch a verification code.
pub async fn send_code(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SendCodeBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let channel = VerificationChannel::parse_str(&body.channel)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown channel '{}'", body.channel)))?;

    let code = state
        .booking
        .verification
        .issue_code(auth_user.user_id, channel)
        .await?;

    match channel {
        VerificationChannel::Email => {
            let email = auth_user
                .email
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("Token carries no email".to_string()))?;
            state.booking.notifications.send_email_code(email, &code).await?;
        }
        VerificationChannel::Whatsapp => {
            let phone = body
                .phone
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest("Phone number is required".to_string()))?;
            state
                .booking
                .notifications
                .send_whatsapp_code(phone, &code)
                .await?;
        }
    }

    Ok(Json(json!({ "status": "sent", "channel": channel.as_str() })))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmCodeBody {
    pub channel: String,
    pub code: String,
}

/// Confirm a previously issued code.
pub async fn confirm_code(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ConfirmCodeBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let channel = VerificationChannel::parse_str(&body.channel)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown channel '{}'", body.channel)))?;

    state
        .booking
        .verification
        .confirm_code(auth_user.user_id, channel, &body.code)
        .await?;

    Ok(Json(json!({ "status": "confirmed", "channel": channel.as_str() })))
}

#[derive(Debug, Serialize)]
pub struct VerificationStatusResponse {
    pub record: VerificationRecord,
    pub is_verified: bool,
    /// Services still locked for this user, by display name.
    pub restricted_services: Vec<&'static str>,
}

/// Current verification status plus the restriction list the dashboard
/// notice renders.
pub async fn status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<VerificationStatusResponse>> {
    let record = state
        .booking
        .verification
        .get_record(auth_user.user_id)
        .await?;
    let is_verified = record.is_verified();

    Ok(Json(VerificationStatusResponse {
        record,
        is_verified,
        restricted_services: service_restrictions(is_verified),
    }))
}
