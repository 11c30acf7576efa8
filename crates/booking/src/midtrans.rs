//! Midtrans payment gateway client
//!
//! Thin wrapper over the Snap REST API. Midtrans ships no maintained Rust
//! SDK, so this talks to the two endpoints we need directly: Snap session
//! creation and transaction status lookup. Authentication is HTTP Basic
//! with the server key as username and an empty password.

use serde::{Deserialize, Serialize};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::error::{BookingError, BookingResult};

const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1";
const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com/snap/v1";

/// Midtrans credentials and environment selection.
#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub client_key: String,
    pub production: bool,
    /// Explicit opt-in for the fabricated-success fallback used in local
    /// development without credentials. Never enable in production.
    pub allow_dev_fallback: bool,
    /// Overridable for tests; derived from `production` otherwise.
    pub snap_base_url: String,
}

impl MidtransConfig {
    pub fn from_env() -> BookingResult<Self> {
        let server_key = std::env::var("MIDTRANS_SERVER_KEY").unwrap_or_default();
        let client_key = std::env::var("MIDTRANS_CLIENT_KEY").unwrap_or_default();
        let production = std::env::var("MIDTRANS_PRODUCTION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let allow_dev_fallback = std::env::var("MIDTRANS_ALLOW_DEV_FALLBACK")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if server_key.is_empty() && !allow_dev_fallback {
            return Err(BookingError::NotConfigured(
                "MIDTRANS_SERVER_KEY is not set".to_string(),
            ));
        }

        if allow_dev_fallback && production {
            return Err(BookingError::NotConfigured(
                "MIDTRANS_ALLOW_DEV_FALLBACK cannot be combined with MIDTRANS_PRODUCTION"
                    .to_string(),
            ));
        }

        let snap_base_url = if production {
            PRODUCTION_SNAP_URL.to_string()
        } else {
            SANDBOX_SNAP_URL.to_string()
        };

        Ok(Self {
            server_key,
            client_key,
            production,
            allow_dev_fallback,
            snap_base_url,
        })
    }
}

/// Customer details attached to a Snap session.
#[derive(Debug, Clone, Serialize)]
pub struct SnapCustomer {
    pub first_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct SnapTransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct CreateSnapRequest<'a> {
    transaction_details: SnapTransactionDetails<'a>,
    customer_details: &'a SnapCustomer,
}

/// Snap session handle returned by Midtrans.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapSession {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct SnapErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
}

/// HTTP client for the Midtrans Snap API.
#[derive(Clone)]
pub struct MidtransClient {
    config: MidtransConfig,
    http: reqwest::Client,
}

impl MidtransClient {
    pub fn new(config: MidtransConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> BookingResult<Self> {
        Ok(Self::new(MidtransConfig::from_env()?))
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    /// Create a Snap payment session for an order.
    ///
    /// Transient failures retry with exponential backoff (3 attempts);
    /// Midtrans rejects duplicate order ids, so replays of a successful
    /// create fail loudly rather than double-charging.
    pub async fn create_snap_transaction(
        &self,
        order_id: &str,
        gross_amount: i64,
        customer: &SnapCustomer,
    ) -> BookingResult<SnapSession> {
        if self.config.server_key.is_empty() {
            if self.config.allow_dev_fallback {
                tracing::warn!(
                    order_id = %order_id,
                    "MIDTRANS_ALLOW_DEV_FALLBACK active - fabricating Snap session"
                );
                return Ok(SnapSession {
                    token: format!("dev-{}", order_id),
                    redirect_url: format!("http://localhost:3000/dev-payment/{}", order_id),
                });
            }
            return Err(BookingError::NotConfigured(
                "Midtrans server key missing".to_string(),
            ));
        }

        let strategy = ExponentialBackoff::from_millis(200).map(jitter).take(3);

        let session = Retry::spawn(strategy, || async {
            self.create_snap_once(order_id, gross_amount, customer).await
        })
        .await?;

        tracing::info!(
            order_id = %order_id,
            gross_amount = gross_amount,
            "Snap session created"
        );

        Ok(session)
    }

    async fn create_snap_once(
        &self,
        order_id: &str,
        gross_amount: i64,
        customer: &SnapCustomer,
    ) -> BookingResult<SnapSession> {
        let url = format!("{}/transactions", self.config.snap_base_url);
        let body = CreateSnapRequest {
            transaction_details: SnapTransactionDetails {
                order_id,
                gross_amount,
            },
            customer_details: customer,
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.server_key, Some(""))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<SnapErrorBody>()
                .await
                .map(|b| b.error_messages.join("; "))
                .unwrap_or_default();
            tracing::error!(
                order_id = %order_id,
                http_status = %status,
                detail = %detail,
                "Snap session creation failed"
            );
            return Err(BookingError::MidtransApi(format!(
                "Snap create returned {}: {}",
                status, detail
            )));
        }

        Ok(response.json::<SnapSession>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: String) -> MidtransConfig {
        MidtransConfig {
            server_key: "SB-Mid-server-testkey".to_string(),
            client_key: "SB-Mid-client-testkey".to_string(),
            production: false,
            allow_dev_fallback: false,
            snap_base_url: base_url,
        }
    }

    fn customer() -> SnapCustomer {
        SnapCustomer {
            first_name: "Dina".to_string(),
            email: "dina@example.com".to_string(),
            phone: Some("+628123456789".to_string()),
        }
    }

    #[tokio::test]
    async fn create_snap_parses_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transactions")
            .match_header("authorization", mockito::Matcher::Any)
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"abc123","redirect_url":"https://app.sandbox.midtrans.com/snap/v2/vtweb/abc123"}"#)
            .create_async()
            .await;

        let client = MidtransClient::new(test_config(server.url()));
        let session = client
            .create_snap_transaction("TMN-1", 570_000, &customer())
            .await
            .unwrap();

        assert_eq!(session.token, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_snap_surfaces_gateway_errors() {
        let mut server = mockito::Server::new_async().await;
        // expect(4): initial attempt + 3 retries
        let mock = server
            .mock("POST", "/transactions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error_messages":["Access denied"]}"#)
            .expect(4)
            .create_async()
            .await;

        let client = MidtransClient::new(test_config(server.url()));
        let err = client
            .create_snap_transaction("TMN-2", 25_000, &customer())
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::MidtransApi(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dev_fallback_requires_explicit_gate() {
        let config = MidtransConfig {
            server_key: String::new(),
            client_key: String::new(),
            production: false,
            allow_dev_fallback: false,
            snap_base_url: SANDBOX_SNAP_URL.to_string(),
        };
        let client = MidtransClient::new(config);
        let err = client
            .create_snap_transaction("TMN-3", 25_000, &customer())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn dev_fallback_fabricates_session_when_gated_on() {
        let config = MidtransConfig {
            server_key: String::new(),
            client_key: String::new(),
            production: false,
            allow_dev_fallback: true,
            snap_base_url: SANDBOX_SNAP_URL.to_string(),
        };
        let client = MidtransClient::new(config);
        let session = client
            .create_snap_transaction("TMN-4", 25_000, &customer())
            .await
            .unwrap();
        assert_eq!(session.token, "dev-TMN-4");
    }
}
