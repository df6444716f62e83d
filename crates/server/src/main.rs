mod api;
mod bootstrap;
mod health;
mod session;

use anyhow::Result;
use asha_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use asha_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
        app.knowledge.clone(),
    )
    .await?;

    if app.config.scraper.enabled {
        let _refresh_task = asha_ingest::scheduler::spawn(
            app.config.scraper.clone(),
            app.config.knowledge.data_dir.clone(),
            app.knowledge.clone(),
        );
        tracing::info!(
            event_name = "system.server.scheduler_started",
            interval_secs = app.config.scraper.refresh_interval_secs,
            "knowledge refresh scheduler enabled"
        );
    } else {
        tracing::info!(
            event_name = "system.server.scheduler_disabled",
            "knowledge refresh scheduler disabled by configuration"
        );
    }

    let chat_address =
        format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&chat_address).await?;

    let router = api::router(app.db_pool.clone(), app.knowledge.clone(), &app.config);

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %chat_address,
        "asha-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "asha-server stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
