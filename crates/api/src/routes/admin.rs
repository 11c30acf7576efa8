//! Platform admin routes
//!
//! These routes are protected by a platform_role check (admin, superadmin).
//! Staff can read but not write.

use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use temanly_booking::PendingVerification;
use temanly_shared::PlatformRole;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::extract_client_ip;
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct PlatformRoleRow {
    platform_role: String,
}

/// Check that the authenticated user has platform admin privileges
async fn require_platform_admin(
    state: &AppState,
    auth_user: &AuthUser,
    require_write: bool,
) -> ApiResult<Uuid> {
    let row: Option<PlatformRoleRow> = sqlx::query_as(
        "SELECT platform_role::TEXT as platform_role FROM users WHERE id = $1",
    )
    .bind(auth_user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    let platform_role = row
        .and_then(|r| PlatformRole::parse_str(&r.platform_role))
        .unwrap_or(PlatformRole::User);

    let allowed = if require_write {
        platform_role.can_write_admin()
    } else {
        platform_role.can_read_admin()
    };

    if !allowed {
        tracing::warn!(
            user_id = %auth_user.user_id,
            platform_role = %platform_role.as_str(),
            "Unauthorized admin access attempt"
        );
        return Err(ApiError::Forbidden);
    }

    Ok(auth_user.user_id)
}

/// Write an admin action to the audit log. Audit rows are mandatory for
/// admin mutations; a failed insert fails the request.
async fn log_admin_action(
    pool: &sqlx::PgPool,
    admin_user_id: Uuid,
    action: &str,
    target_user_id: Option<Uuid>,
    details: Option<serde_json::Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
) -> ApiResult<()> {
    sqlx::query(
        r#"
        INSERT INTO admin_audit_log (admin_user_id, action, target_user_id, details, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(admin_user_id)
    .bind(action)
    .bind(target_user_id)
    .bind(details)
    .bind(ip_address)
    .bind(user_agent)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, action = %action, "Failed to write audit log");
        ApiError::Internal
    })?;

    Ok(())
}

fn extract_audit_context(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = extract_client_ip(headers);
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    (ip_address, user_agent)
}

#[derive(Debug, Deserialize)]
pub struct ListVerificationsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct VerificationQueueResponse {
    pub pending: Vec<PendingVerification>,
}

/// List users awaiting document review, oldest first.
pub async fn list_verifications(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListVerificationsQuery>,
) -> ApiResult<Json<VerificationQueueResponse>> {
    require_platform_admin(&state, &auth_user, false).await?;

    let pending = state
        .booking
        .verification
        .list_pending(query.limit.unwrap_or(50))
        .await?;

    Ok(Json(VerificationQueueResponse { pending }))
}

/// Approve a pending verification.
pub async fn approve_verification(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let admin_id = require_platform_admin(&state, &auth_user, true).await?;

    state.booking.verification.approve(user_id, admin_id).await?;

    let (ip_address, user_agent) = extract_audit_context(&headers);
    log_admin_action(
        &state.pool,
        admin_id,
        "verification_approved",
        Some(user_id),
        None,
        ip_address,
        user_agent,
    )
    .await?;

    Ok(Json(serde_json::json!({ "status": "approved" })))
}

#[derive(Debug, Deserialize)]
pub struct RejectVerificationBody {
    pub reason: String,
}

/// Reject a pending verification with a reason shown to the user.
pub async fn reject_verification(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<RejectVerificationBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let admin_id = require_platform_admin(&state, &auth_user, true).await?;

    state
        .booking
        .verification
        .reject(user_id, admin_id, &body.reason)
        .await?;

    let (ip_address, user_agent) = extract_audit_context(&headers);
    log_admin_action(
        &state.pool,
        admin_id,
        "verification_rejected",
        Some(user_id),
        Some(serde_json::json!({ "reason": body.reason })),
        ip_address,
        user_agent,
    )
    .await?;

    Ok(Json(serde_json::json!({ "status": "rejected" })))
}

#[derive(Debug, FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(Debug, Serialize)]
pub struct PlatformStatsResponse {
    pub total_users: i64,
    pub pending_verifications: i64,
    pub transactions_by_status: HashMap<String, i64>,
    pub gross_paid_amount: i64,
}

/// Marketplace-wide counters for the admin dashboard.
pub async fn platform_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<PlatformStatsResponse>> {
    require_platform_admin(&state, &auth_user, false).await?;

    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let (pending_verifications,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM user_verifications WHERE status = 'pending'")
            .fetch_one(&state.pool)
            .await?;

    let status_rows: Vec<StatusCountRow> = sqlx::query_as(
        "SELECT status, COUNT(*) as count FROM transactions GROUP BY status",
    )
    .fetch_all(&state.pool)
    .await?;

    let (gross_paid_amount,): (Option<i64>,) =
        sqlx::query_as("SELECT SUM(amount) FROM transactions WHERE status = 'paid'")
            .fetch_one(&state.pool)
            .await?;

    Ok(Json(PlatformStatsResponse {
        total_users,
        pending_verifications,
        transactions_by_status: status_rows
            .into_iter()
            .map(|r| (r.status, r.count))
            .collect(),
        gross_paid_amount: gross_paid_amount.unwrap_or(0),
    }))
}
