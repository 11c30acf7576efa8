// Shared crate clippy configuration
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Temanly Shared Types
//!
//! Database pool construction and the domain enums used by every crate in
//! the workspace: transaction status, verification status, platform roles,
//! and verification channels.

pub mod db;
pub mod types;

pub use db::{create_migration_pool, create_pool, run_migrations};
pub use types::{
    PlatformRole, TransactionStatus, VerificationChannel, VerificationStatus,
};
