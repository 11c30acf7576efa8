//! Domain enums shared across the workspace
//!
//! All of these are stored as TEXT columns, so every enum round-trips
//! through `as_str` / `parse_str` rather than a Postgres enum type.

use serde::{Deserialize, Serialize};

/// Lifecycle of a booking transaction.
///
/// `Pending` is the only state a transaction is created in; every other
/// state is reached through a Midtrans notification or the expiry worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Failed,
    Expired,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Expired => "expired",
            TransactionStatus::Refunded => "refunded",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "paid" => Some(TransactionStatus::Paid),
            "failed" => Some(TransactionStatus::Failed),
            "expired" => Some(TransactionStatus::Expired),
            "refunded" => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }

    /// Terminal states never transition again (the expiry worker and the
    /// notification handler both check this before writing).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Paid
                | TransactionStatus::Failed
                | TransactionStatus::Expired
                | TransactionStatus::Refunded
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review state of a user's identity document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No document submitted yet
    Unsubmitted,
    /// Document submitted, awaiting admin review
    Pending,
    /// Admin approved the document
    Approved,
    /// Admin rejected the document (reason recorded)
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unsubmitted => "unsubmitted",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "unsubmitted" => Some(VerificationStatus::Unsubmitted),
            "pending" => Some(VerificationStatus::Pending),
            "approved" => Some(VerificationStatus::Approved),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform-level role stored on the users table.
///
/// `Staff` can read admin endpoints but not write; see the admin route
/// guard in the api crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    User,
    Talent,
    Staff,
    Admin,
    Superadmin,
}

impl PlatformRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformRole::User => "user",
            PlatformRole::Talent => "talent",
            PlatformRole::Staff => "staff",
            PlatformRole::Admin => "admin",
            PlatformRole::Superadmin => "superadmin",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(PlatformRole::User),
            "talent" => Some(PlatformRole::Talent),
            "staff" => Some(PlatformRole::Staff),
            "admin" => Some(PlatformRole::Admin),
            "superadmin" => Some(PlatformRole::Superadmin),
            _ => None,
        }
    }

    pub fn can_read_admin(&self) -> bool {
        matches!(
            self,
            PlatformRole::Staff | PlatformRole::Admin | PlatformRole::Superadmin
        )
    }

    pub fn can_write_admin(&self) -> bool {
        matches!(self, PlatformRole::Admin | PlatformRole::Superadmin)
    }
}

/// Delivery channel for a verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationChannel {
    Email,
    Whatsapp,
}

impl VerificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationChannel::Email => "email",
            VerificationChannel::Whatsapp => "whatsapp",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "email" => Some(VerificationChannel::Email),
            "whatsapp" => Some(VerificationChannel::Whatsapp),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
