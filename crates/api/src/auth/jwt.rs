//! Validation of Supabase-issued JWTs
//!
//! Credentials live in Supabase; this server never mints tokens. It only
//! validates the HS256 access tokens Supabase issues, using the project's
//! JWT secret, and reads identity out of the standard claims.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

/// Claims of a Supabase access token that we consume.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Supabase user id
    pub sub: String,
    pub email: Option<String>,
    /// "authenticated" for signed-in users
    pub role: Option<String>,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(supabase_jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Supabase sets aud = "authenticated"; we pin it rather than
        // disabling audience checks.
        validation.set_audience(&["authenticated"]);

        Self {
            decoding_key: DecodingKey::from_secret(supabase_jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return its claims, or None for any failure
    /// (expired, bad signature, wrong audience). Callers map None to 401.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "JWT validation failed");
                None
            }
        }
    }

    /// Parse the subject claim into our user id type.
    pub fn user_id_from_claims(claims: &Claims) -> Option<Uuid> {
        Uuid::parse_str(&claims.sub).ok()
    }
}
