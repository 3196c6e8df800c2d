//! # Game Store
//!
//! Storefront commerce service: catalog pricing, carts, checkout and
//! the owned-products library.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Storage backend (PostgreSQL or in-memory)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use game_store::config::Settings;
use game_store::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment and config files
    let settings = Settings::load()?;

    // Initialize tracing subscriber for structured logging
    game_store::telemetry::init_tracing(&settings.log);

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = ?settings.storage.backend,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
