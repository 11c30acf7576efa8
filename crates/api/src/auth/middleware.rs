//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::JwtManager;

/// Authenticated user information extracted from a Supabase JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// State needed for authentication
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: JwtManager,
    pub pool: PgPool,
}

/// Extract bearer token from the Authorization header
pub(crate) fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(String::from)
}

/// Middleware that requires a valid Supabase JWT
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&request) else {
        return unauthorized("missing bearer token");
    };

    let Some(claims) = auth_state.jwt_manager.validate(&token) else {
        return unauthorized("invalid or expired token");
    };

    let Some(user_id) = JwtManager::user_id_from_claims(&claims) else {
        tracing::warn!(sub = %claims.sub, "JWT subject is not a user id");
        return unauthorized("invalid subject");
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
    });

    next.run(request).await
}

fn unauthorized(reason: &str) -> Response {
    tracing::debug!(reason = reason, "Request rejected as unauthorized");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}
