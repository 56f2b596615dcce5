use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use client_portal_api::{app, cli::Cli, config, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, DEMO_* credentials, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::log_level_from_env()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut config = config::config().clone();
    cli.apply(&mut config);

    tracing::info!("Starting client portal API in {:?} mode", config.environment);

    let store = store::connect(&config.store).context("failed to initialize store client")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store, config)))
        .await
        .context("server error")?;
    Ok(())
}
