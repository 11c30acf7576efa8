// Booking crate clippy configuration
// These are intentional patterns in this crate:
#![allow(clippy::result_large_err)] // BookingError::VerificationRequired carries the restriction list
// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Temanly Booking Module
//!
//! The marketplace domain core: service catalog, price calculation,
//! booking eligibility, Midtrans payment sessions and notifications,
//! transaction records, and user/talent verification.
//!
//! ## Features
//!
//! - **Pricing**: deterministic price calculation over the fixed catalog
//! - **Eligibility**: verification gating for in-person services
//! - **Payments**: Snap session creation and notification handling
//! - **Transactions**: booking records and status lifecycle
//! - **Verification**: identity documents, email and WhatsApp codes
//! - **Audit**: append-only booking event trail

pub mod catalog;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod midtrans;
pub mod notifications;
pub mod pricing;
pub mod transactions;
pub mod verification;
pub mod webhooks;

#[cfg(test)]
mod edge_case_tests;

// Catalog
pub use catalog::{
    catalog_entry, is_known_service, ConversionRule, PriceUnit, ServiceCatalogEntry,
    SERVICE_CATALOG,
};

// Pricing
pub use pricing::{
    calculate_service_price, calculate_total_price, DurationUnit, ServiceSelection,
};

// Eligibility
pub use eligibility::{has_restricted_services, is_restricted_service, service_restrictions};

// Error
pub use error::{BookingError, BookingResult};

// Midtrans
pub use midtrans::{MidtransClient, MidtransConfig, SnapCustomer, SnapSession};

// Transactions
pub use transactions::{BookingRequest, CreatedBooking, Transaction, TransactionService};

// Webhooks
pub use webhooks::{
    compute_signature, map_transaction_status, verify_notification_signature,
    NotificationOutcome, PaymentNotification, WebhookHandler,
};

// Verification
pub use verification::{PendingVerification, VerificationRecord, VerificationService};

// Notifications
pub use notifications::{EmailConfig, NotificationService, WhatsappConfig};

// Events
pub use events::{ActorType, BookingEventBuilder, BookingEventLogger, BookingEventType};

use sqlx::PgPool;

/// Main booking service that combines all marketplace functionality
pub struct BookingService {
    pub transactions: TransactionService,
    pub verification: VerificationService,
    pub notifications: NotificationService,
    pub webhooks: WebhookHandler,
}

impl BookingService {
    /// Create a new booking service from environment variables
    pub fn from_env(pool: PgPool) -> BookingResult<Self> {
        let midtrans = MidtransClient::from_env()?;
        let notifications = NotificationService::from_env();

        Ok(Self {
            transactions: TransactionService::new(midtrans.clone(), pool.clone()),
            verification: VerificationService::new(pool.clone()),
            notifications,
            webhooks: WebhookHandler::new(midtrans, pool),
        })
    }

    /// Create a new booking service with explicit config
    pub fn new(config: MidtransConfig, pool: PgPool, notifications: NotificationService) -> Self {
        let midtrans = MidtransClient::new(config);

        Self {
            transactions: TransactionService::new(midtrans.clone(), pool.clone()),
            verification: VerificationService::new(pool.clone()),
            notifications,
            webhooks: WebhookHandler::new(midtrans, pool),
        }
    }
}
