//! HTTP route handlers and router assembly

pub mod admin;
pub mod bookings;
pub mod payments;
pub mod verification;

use axum::http::HeaderMap;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::auth::require_auth;
use crate::state::AppState;

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    // Signature verification is the notification endpoint's auth; health
    // is open for load balancers.
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/payments/notification", post(payments::notification));

    let authenticated = Router::new()
        .route("/api/bookings/quote", post(bookings::quote))
        .route("/api/bookings", post(bookings::create).get(bookings::list))
        .route("/api/bookings/{order_id}", get(bookings::detail))
        .route(
            "/api/verification/document",
            post(verification::submit_document),
        )
        .route("/api/verification/send-code", post(verification::send_code))
        .route(
            "/api/verification/confirm-code",
            post(verification::confirm_code),
        )
        .route("/api/verification/status", get(verification::status))
        .route("/api/admin/verifications", get(admin::list_verifications))
        .route(
            "/api/admin/verifications/{user_id}/approve",
            post(admin::approve_verification),
        )
        .route(
            "/api/admin/verifications/{user_id}/reject",
            post(admin::reject_verification),
        )
        .route("/api/admin/stats", get(admin::platform_stats))
        .layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(authenticated).with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Extract client IP from proxy headers (X-Forwarded-For first hop, then
/// X-Real-IP). Used for admin audit rows.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("X-Forwarded-For") {
        if let Ok(xff_str) = xff.to_str() {
            return xff_str.split(',').next().map(|s| s.trim().to_string());
        }
    }
    if let Some(real_ip) = headers.get("X-Real-IP") {
        if let Ok(ip) = real_ip.to_str() {
            return Some(ip.to_string());
        }
    }
    None
}
