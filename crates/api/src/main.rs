// API server clippy configuration
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Temanly API Server
//!
//! The main API server for the Temanly marketplace: booking quotes and
//! creation, Midtrans payment notifications, verification workflows, and
//! admin approval endpoints.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;

use axum::http::{header, Method};
use temanly_booking::BookingService;
use temanly_shared::create_pool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{config::Config, routes::create_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,temanly_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Temanly API Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("Configuration loaded");

    // Create database pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    temanly_shared::run_migrations(&pool).await?;

    // Initialize the booking service (Midtrans + notification senders)
    let booking = BookingService::from_env(pool.clone())
        .map_err(|e| anyhow::anyhow!("Booking service init failed: {}", e))?;
    tracing::info!("Booking service initialized");

    // Create application state
    let state = AppState::new(pool, config.clone(), booking);

    // Build CORS layer - restrict to allowed origins only
    let allowed_origins: Vec<axum::http::HeaderValue> = config
        .allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    tracing::info!(
        allowed_origins = ?allowed_origins,
        "CORS configured with {} allowed origins",
        allowed_origins.len()
    );

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    // Build the router
    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Parse bind address
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Starting server on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
