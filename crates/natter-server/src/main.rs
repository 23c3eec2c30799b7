//! # natter-server
//!
//! HTTP backend for a small messaging/contacts service.
//!
//! This binary provides:
//! - **Chats and membership**: create chats, add/remove members, read
//!   rosters and per-member chat lists
//! - **Contacts**: directed contact requests with mutual confirmation
//! - **Member directory**: listing, search, and single profiles
//! - **Demo notes**: the worked CRUD example resource
//! - **Weather proxy**: normalized forecasts from the upstream weather
//!   service
//!
//! Mutations run through the guarded pipeline in `natter-pipeline`;
//! persistence lives in `natter-store` (SQLite via sqlx).

mod auth;
mod config;
mod error;
mod routes;
mod weather;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use natter_store::Store;

use crate::config::ServerConfig;
use crate::routes::AppState;
use crate::weather::WeatherClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,natter_server=debug")),
        )
        .init();

    info!("Starting natter server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Store (runs pending migrations on open)
    let store = Store::connect(&config.database_url, config.database_max_connections).await?;

    // Upstream weather client
    let weather = Arc::new(WeatherClient::new(
        config.weather_base_url.clone(),
        &config.weather_user_agent,
    )?);

    let state = AppState {
        store: store.clone(),
        weather,
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = routes::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    store.close().await;
    Ok(())
}
