//! API server configuration

use crate::error::{ApiError, ApiResult};

/// Runtime configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// HS256 secret of the Supabase project issuing our JWTs
    pub supabase_jwt_secret: String,
    /// Comma-separated origin allowlist for CORS
    pub allowed_origins: String,
}

impl Config {
    pub fn from_env() -> ApiResult<Self> {
        let database_url = require_var("DATABASE_URL")?;
        let supabase_jwt_secret = require_var("SUPABASE_JWT_SECRET")?;

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

        Ok(Self {
            database_url,
            bind_address,
            supabase_jwt_secret,
            allowed_origins,
        })
    }
}

fn require_var(key: &str) -> ApiResult<String> {
    std::env::var(key).map_err(|_| {
        tracing::error!(var = key, "Required environment variable not set");
        ApiError::Config(format!("{} must be set", key))
    })
}
