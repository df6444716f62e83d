use crate::commands::CommandResult;
use asha_core::config::{AppConfig, LoadOptions};
use asha_ingest::refresh_all;

/// One-shot scrape-and-merge of the job and event sources, regardless of
/// whether the background scheduler is enabled.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "scrape",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "scrape",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(refresh_all(&config.scraper, &config.knowledge.data_dir)) {
        Ok(summary) => CommandResult::success(
            "scrape",
            format!(
                "jobs: {} total ({} new), events: {} total ({} new)",
                summary.jobs_total, summary.jobs_added, summary.events_total, summary.events_added
            ),
        ),
        Err(error) => CommandResult::failure("scrape", "refresh", error.to_string(), 4),
    }
}
