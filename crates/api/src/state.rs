//! Application state

use sqlx::PgPool;
use std::sync::Arc;

use temanly_booking::BookingService;

use crate::auth::{AuthState, JwtManager};
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub jwt_manager: JwtManager,
    pub booking: Arc<BookingService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, booking: BookingService) -> Self {
        let jwt_manager = JwtManager::new(&config.supabase_jwt_secret);
        tracing::info!("Supabase JWT validation enabled");

        Self {
            pool,
            config,
            jwt_manager,
            booking: Arc::new(booking),
        }
    }

    /// Get auth state for middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_manager: self.jwt_manager.clone(),
            pool: self.pool.clone(),
        }
    }
}
