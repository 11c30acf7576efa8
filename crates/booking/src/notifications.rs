//! Outbound verification messages
//!
//! Email codes go through EmailJS, WhatsApp codes through a messaging
//! gateway. Both services are optional at runtime: an unconfigured sender
//! logs a warning at startup and errors on use, unless the same explicit
//! dev fallback gate as the payment client is enabled.

use serde_json::json;

use crate::error::{BookingError, BookingResult};

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// EmailJS credentials.
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

/// WhatsApp gateway credentials.
#[derive(Debug, Clone, Default)]
pub struct WhatsappConfig {
    pub gateway_url: String,
    pub api_token: String,
}

/// Sends verification codes over email and WhatsApp.
#[derive(Clone)]
pub struct NotificationService {
    email: Option<EmailConfig>,
    whatsapp: Option<WhatsappConfig>,
    allow_dev_fallback: bool,
    http: reqwest::Client,
    /// Overridable EmailJS endpoint for tests.
    email_send_url: String,
}

impl NotificationService {
    pub fn from_env() -> Self {
        let email = match (
            std::env::var("EMAILJS_SERVICE_ID"),
            std::env::var("EMAILJS_TEMPLATE_ID"),
            std::env::var("EMAILJS_PUBLIC_KEY"),
        ) {
            (Ok(service_id), Ok(template_id), Ok(public_key)) => Some(EmailConfig {
                service_id,
                template_id,
                public_key,
            }),
            _ => None,
        };

        let whatsapp = match (
            std::env::var("WHATSAPP_GATEWAY_URL"),
            std::env::var("WHATSAPP_API_TOKEN"),
        ) {
            (Ok(gateway_url), Ok(api_token)) => Some(WhatsappConfig {
                gateway_url,
                api_token,
            }),
            _ => None,
        };

        let allow_dev_fallback = std::env::var("NOTIFICATIONS_ALLOW_DEV_FALLBACK")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if email.is_none() {
            tracing::warn!("Email verification sending not configured (missing EMAILJS_* vars)");
        }
        if whatsapp.is_none() {
            tracing::warn!(
                "WhatsApp verification sending not configured (missing WHATSAPP_* vars)"
            );
        }

        Self {
            email,
            whatsapp,
            allow_dev_fallback,
            http: reqwest::Client::new(),
            email_send_url: EMAILJS_SEND_URL.to_string(),
        }
    }

    pub fn new(
        email: Option<EmailConfig>,
        whatsapp: Option<WhatsappConfig>,
        allow_dev_fallback: bool,
    ) -> Self {
        Self {
            email,
            whatsapp,
            allow_dev_fallback,
            http: reqwest::Client::new(),
            email_send_url: EMAILJS_SEND_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_email_send_url(mut self, url: String) -> Self {
        self.email_send_url = url;
        self
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    pub fn whatsapp_enabled(&self) -> bool {
        self.whatsapp.is_some()
    }

    /// Send a verification code by email.
    pub async fn send_email_code(&self, to_email: &str, code: &str) -> BookingResult<()> {
        let Some(config) = &self.email else {
            if self.allow_dev_fallback {
                tracing::warn!(to_email = %to_email, "Dev fallback: email code not actually sent");
                return Ok(());
            }
            return Err(BookingError::NotConfigured(
                "EmailJS credentials missing".to_string(),
            ));
        };

        let body = json!({
            "service_id": config.service_id,
            "template_id": config.template_id,
            "user_id": config.public_key,
            "template_params": {
                "to_email": to_email,
                "verification_code": code,
            },
        });

        let response = self
            .http
            .post(&self.email_send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BookingError::Internal(format!("EmailJS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                to_email = %to_email,
                http_status = %status,
                detail = %detail,
                "EmailJS send failed"
            );
            return Err(BookingError::Internal(format!(
                "EmailJS returned {}",
                status
            )));
        }

        tracing::info!(to_email = %to_email, "Verification email sent");
        Ok(())
    }

    /// Send a verification code over WhatsApp.
    pub async fn send_whatsapp_code(&self, phone: &str, code: &str) -> BookingResult<()> {
        let Some(config) = &self.whatsapp else {
            if self.allow_dev_fallback {
                tracing::warn!(phone = %phone, "Dev fallback: WhatsApp code not actually sent");
                return Ok(());
            }
            return Err(BookingError::NotConfigured(
                "WhatsApp gateway credentials missing".to_string(),
            ));
        };

        let body = json!({
            "phone": phone,
            "message": format!("Kode verifikasi Temanly kamu: {}. Berlaku 10 menit.", code),
        });

        let response = self
            .http
            .post(format!("{}/send", config.gateway_url))
            .bearer_auth(&config.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BookingError::Internal(format!("WhatsApp gateway request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                phone = %phone,
                http_status = %status,
                "WhatsApp gateway send failed"
            );
            return Err(BookingError::Internal(format!(
                "WhatsApp gateway returned {}",
                status
            )));
        }

        tracing::info!(phone = %phone, "Verification WhatsApp message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_email_errors_without_gate() {
        let service = NotificationService::new(None, None, false);
        let err = service
            .send_email_code("a@example.com", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn dev_fallback_swallows_send_when_gated_on() {
        let service = NotificationService::new(None, None, true);
        assert!(service
            .send_email_code("a@example.com", "123456")
            .await
            .is_ok());
        assert!(service
            .send_whatsapp_code("+628123", "123456")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn email_send_posts_template_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1.0/email/send")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"template_params":{"verification_code":"987654"}}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let service = NotificationService::new(
            Some(EmailConfig {
                service_id: "svc".to_string(),
                template_id: "tpl".to_string(),
                public_key: "pk".to_string(),
            }),
            None,
            false,
        )
        .with_email_send_url(format!("{}/api/v1.0/email/send", server.url()));

        service
            .send_email_code("a@example.com", "987654")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1.0/email/send")
            .with_status(403)
            .create_async()
            .await;

        let service = NotificationService::new(
            Some(EmailConfig {
                service_id: "svc".to_string(),
                template_id: "tpl".to_string(),
                public_key: "pk".to_string(),
            }),
            None,
            false,
        )
        .with_email_send_url(format!("{}/api/v1.0/email/send", server.url()));

        assert!(service.send_email_code("a@example.com", "1").await.is_err());
    }
}
