//! # StarsClub Server
//!
//! Application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - Background jobs (Telegram bot listener, auth code janitor)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use starsclub::config::Settings;
use starsclub::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    starsclub::telemetry::init_tracing();

    info!("Starting StarsClub server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        telegram = settings.telegram.is_enabled(),
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
