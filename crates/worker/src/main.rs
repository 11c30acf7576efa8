//! Temanly Background Worker
//!
//! Handles scheduled jobs including:
//! - Expiring stale pending transactions (every 10 minutes)
//! - Purging consumed/expired verification codes (daily at 3:00 UTC)
//! - Health check heartbeat (every 5 minutes)

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use temanly_booking::BookingService;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Pending transactions older than this are expired. Midtrans Snap
/// sessions themselves expire after 24 hours, so anything still pending
/// past that can never settle.
const PENDING_MAX_AGE_HOURS: i64 = 24;

/// Create a database connection pool
async fn create_db_pool() -> anyhow::Result<sqlx::PgPool> {
    #[allow(clippy::expect_used)] // Fail-fast on startup if required config is missing
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    info!("Database pool created");
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    info!("Starting Temanly Worker");

    // Create database pool
    let pool = create_db_pool().await?;

    // Create booking service
    let booking = match BookingService::from_env(pool.clone()) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            // Without Midtrans credentials there is nothing to expire
            // against; run in minimal mode rather than crash-looping.
            warn!(error = %e, "Failed to create booking service - running in minimal mode");

            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                info!("Worker heartbeat (minimal mode)");
            }
        }
    };

    // Create scheduler
    let scheduler = JobScheduler::new().await?;

    // Job 1: Expire stale pending transactions every 10 minutes
    let booking_for_expiry = booking.clone();
    scheduler
        .add(Job::new_async("0 */10 * * * *", move |_uuid, _l| {
            let booking = booking_for_expiry.clone();
            Box::pin(async move {
                match booking
                    .transactions
                    .expire_stale_pending(PENDING_MAX_AGE_HOURS)
                    .await
                {
                    Ok(0) => {}
                    Ok(count) => info!(count = count, "Expired stale pending transactions"),
                    Err(e) => error!(error = %e, "Failed to expire pending transactions"),
                }
            })
        })?)
        .await?;
    info!("Scheduled: Pending transaction expiry (every 10 minutes)");

    // Job 2: Purge consumed/expired verification codes daily
    let booking_for_purge = booking.clone();
    scheduler
        .add(Job::new_async("0 0 3 * * *", move |_uuid, _l| {
            let booking = booking_for_purge.clone();
            Box::pin(async move {
                match booking.verification.purge_stale_codes().await {
                    Ok(count) => info!(count = count, "Purged stale verification codes"),
                    Err(e) => error!(error = %e, "Failed to purge verification codes"),
                }
            })
        })?)
        .await?;
    info!("Scheduled: Verification code purge (daily 3:00 UTC)");

    // Job 3: Health check heartbeat (every 5 minutes)
    scheduler
        .add(Job::new_async("0 */5 * * * *", |_uuid, _l| {
            Box::pin(async move {
                info!("Worker heartbeat - all systems operational");
            })
        })?)
        .await?;
    info!("Scheduled: Health check heartbeat (every 5 minutes)");

    // Start the scheduler
    scheduler.start().await?;
    info!("Worker scheduler started");

    // Keep the process alive
    loop {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}
