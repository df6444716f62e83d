use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use asha_core::config::ScraperConfig;
use asha_core::KnowledgeBase;

use crate::refresh;

/// Spawn the periodic knowledge refresh loop: scrape, merge into the data
/// files, reload the in-memory knowledge base, sleep for the configured
/// interval. A failed cycle logs and retries after the shorter back-off
/// delay instead of terminating the loop.
pub fn spawn(
    config: ScraperConfig,
    data_dir: PathBuf,
    shared: Arc<RwLock<KnowledgeBase>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = config.refresh_interval_secs,
            "knowledge refresh scheduler started"
        );

        loop {
            let delay = match run_cycle(&config, &data_dir, &shared).await {
                Ok(()) => Duration::from_secs(config.refresh_interval_secs),
                Err(error) => {
                    error!(error = %error, "knowledge refresh cycle failed, will retry");
                    Duration::from_secs(config.retry_delay_secs)
                }
            };

            tokio::time::sleep(delay).await;
        }
    })
}

async fn run_cycle(
    config: &ScraperConfig,
    data_dir: &Path,
    shared: &Arc<RwLock<KnowledgeBase>>,
) -> Result<(), refresh::RefreshError> {
    let summary = refresh::refresh_all(config, data_dir).await?;

    let reloaded = KnowledgeBase::load_dir(data_dir)?;
    let mut guard = shared.write().await;
    *guard = reloaded;

    info!(
        jobs = summary.jobs_total,
        events = summary.events_total,
        "in-memory knowledge base reloaded"
    );
    Ok(())
}
