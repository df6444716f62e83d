use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use asha_core::config::ScraperConfig;
use asha_core::knowledge::{self, KnowledgeError, EVENTS_FILE, JOBS_FILE};
use asha_core::{EventRecord, JobRecord, KnowledgeBase};

use crate::scraper::{ScrapeError, Scraper};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub jobs_total: usize,
    pub jobs_added: usize,
    pub events_total: usize,
    pub events_added: usize,
}

/// Scrape both sources and merge the results into the knowledge files.
/// Freshly scraped records are appended when their id is unseen; existing
/// records are never rewritten.
pub async fn refresh_all(
    config: &ScraperConfig,
    data_dir: &Path,
) -> Result<RefreshSummary, RefreshError> {
    let scraper = Scraper::new(config.clone())?;
    let existing = KnowledgeBase::load_dir(data_dir)?;

    let scraped_jobs = scraper.fetch_jobs().await;
    let (jobs, jobs_added) = merge_jobs(existing.jobs, scraped_jobs);
    knowledge::write_records(&data_dir.join(JOBS_FILE), &jobs)?;

    let scraped_events = scraper.fetch_events().await;
    let (events, events_added) = merge_events(existing.events, scraped_events);
    knowledge::write_records(&data_dir.join(EVENTS_FILE), &events)?;

    let summary = RefreshSummary {
        jobs_total: jobs.len(),
        jobs_added,
        events_total: events.len(),
        events_added,
    };
    info!(
        jobs_total = summary.jobs_total,
        jobs_added = summary.jobs_added,
        events_total = summary.events_total,
        events_added = summary.events_added,
        "knowledge refresh finished"
    );
    Ok(summary)
}

pub fn merge_jobs(
    existing: Vec<JobRecord>,
    scraped: Vec<JobRecord>,
) -> (Vec<JobRecord>, usize) {
    let mut seen: BTreeSet<String> =
        existing.iter().filter(|job| !job.id.is_empty()).map(|job| job.id.clone()).collect();

    let mut merged = existing;
    let mut added = 0;
    for job in scraped {
        if job.id.is_empty() || !seen.insert(job.id.clone()) {
            continue;
        }
        merged.push(job);
        added += 1;
    }

    (merged, added)
}

pub fn merge_events(
    existing: Vec<EventRecord>,
    scraped: Vec<EventRecord>,
) -> (Vec<EventRecord>, usize) {
    let mut seen: BTreeSet<String> = existing
        .iter()
        .filter(|event| !event.id.is_empty())
        .map(|event| event.id.clone())
        .collect();

    let mut merged = existing;
    let mut added = 0;
    for event in scraped {
        if event.id.is_empty() || !seen.insert(event.id.clone()) {
            continue;
        }
        merged.push(event);
        added += 1;
    }

    (merged, added)
}
