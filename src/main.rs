// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Marketing Site API Service
//!
//! Serves the dynamic parts of the consulting marketing site:
//!
//! - `POST /contact`: contact form intake (rate limited, validated,
//!   honeypot filtered, mailed via Resend or SMTP, or logged)
//! - `GET /podcast-feed`: latest podcast episodes from the show's RSS feed
//! - `GET /health`, `GET /metrics`
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables, see
//! [`Config::from_env`](marketing_site_api::Config::from_env). The most
//! common ones:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `CONTACT_RATE_LIMIT`: Submissions per window per client (default: 5)
//! - `CONTACT_RATE_WINDOW_SECS`: Window length (default: 900)
//! - `RESEND_API_KEY`, `SMTP_HOST`/`SMTP_USER`/`SMTP_PASS`: mail transports

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketing_site_api::{handlers::AppState, router, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config.clone())?);

    info!(
        bind_addr = %config.bind_addr,
        environment = ?config.environment,
        rate_limit = config.rate_limit.max_requests,
        rate_window_secs = config.rate_limit.window_secs,
        mail_transports = ?state.dispatcher.providers(),
        feed_url = %config.feed.url,
        "Starting marketing site API"
    );

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_interval = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
