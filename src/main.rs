mod common;
mod config;
mod readings;
mod routes;
mod sheets;

#[cfg(test)]
mod test_helpers;

use crate::config::Config;
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing/logging
    tracing_subscriber::fmt::init();

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env()?;

    tracing::info!(
        "Starting server {} ({} deployment), readings sheet '{}'",
        config.app_name,
        config.deployment.to_uppercase(),
        config.target_sheet
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let router = routes::build_router(&config);

    axum::serve(listener, router.into_make_service())
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
