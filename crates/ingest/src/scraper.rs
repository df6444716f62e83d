use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use asha_core::config::ScraperConfig;
use asha_core::{EventRecord, JobRecord};

use crate::fallback;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http client could not be built: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to `{url}` failed: {source}")]
    Request { url: String, source: reqwest::Error },
}

/// Fetches job and event listings from the portal site. Every failure path
/// degrades to the bundled fallback datasets so a refresh can never leave
/// the knowledge base empty.
pub struct Scraper {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client, config })
    }

    pub async fn fetch_jobs(&self) -> Vec<JobRecord> {
        let url = self.config.jobs_url.clone();
        match self.fetch_page(&url).await {
            Ok(html) => {
                let jobs = extract_jobs(&html, &url);
                if jobs.is_empty() {
                    warn!(url = %url, "no job cards found in page, using fallback data");
                    fallback::sample_jobs()
                } else {
                    info!(url = %url, count = jobs.len(), "scraped job listings");
                    jobs
                }
            }
            Err(error) => {
                warn!(url = %url, error = %error, "job scrape failed, using fallback data");
                fallback::sample_jobs()
            }
        }
    }

    pub async fn fetch_events(&self) -> Vec<EventRecord> {
        let url = self.config.events_url.clone();
        match self.fetch_page(&url).await {
            Ok(html) => {
                let events = extract_events(&html, &url);
                if events.is_empty() {
                    warn!(url = %url, "no event cards found in page, using fallback data");
                    fallback::sample_events()
                } else {
                    info!(url = %url, count = events.len(), "scraped event listings");
                    events
                }
            }
            Err(error) => {
                warn!(url = %url, error = %error, "event scrape failed, using fallback data");
                fallback::sample_events()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })?;

        response.text().await.map_err(|source| ScrapeError::Request {
            url: url.to_string(),
            source,
        })
    }
}

/// Extract job cards from listing markup: container elements whose class
/// carries a `job` marker, with heading/company/location/description
/// children selected by class name.
pub fn extract_jobs(html: &str, base_url: &str) -> Vec<JobRecord> {
    let today = Utc::now().format("%Y-%m-%d").to_string();

    card_blocks(html, "job")
        .into_iter()
        .filter_map(|block| {
            let title = heading_text(&block)?;
            Some(JobRecord {
                id: Uuid::new_v4().to_string(),
                title,
                company: class_text(&block, "company").unwrap_or_else(|| "Company".to_string()),
                location: class_text(&block, "location")
                    .unwrap_or_else(|| "Various Locations".to_string()),
                description: class_text(&block, "description")
                    .or_else(|| class_text(&block, "summary"))
                    .unwrap_or_else(|| "No description provided.".to_string()),
                requirements: "Please check the job listing for detailed requirements."
                    .to_string(),
                url: first_link(&block, base_url),
                date_posted: Some(today.clone()),
                ..JobRecord::default()
            })
        })
        .collect()
}

pub fn extract_events(html: &str, base_url: &str) -> Vec<EventRecord> {
    card_blocks(html, "event")
        .into_iter()
        .enumerate()
        .filter_map(|(index, block)| {
            let title = heading_text(&block)?;
            let location = class_text(&block, "location").unwrap_or_else(|| "Virtual".to_string());
            let mode = if location.to_lowercase().contains("virtual")
                || location.to_lowercase().contains("online")
            {
                "online"
            } else {
                "in-person"
            };

            Some(EventRecord {
                id: format!("event-{}", index + 1),
                title,
                date: class_text(&block, "date").unwrap_or_else(|| "TBD".to_string()),
                location,
                description: class_text(&block, "description")
                    .or_else(|| class_text(&block, "summary"))
                    .unwrap_or_else(|| "Join this exciting event for professionals.".to_string()),
                organizer: class_text(&block, "organizer")
                    .or_else(|| class_text(&block, "host"))
                    .unwrap_or_else(|| "Herkey".to_string()),
                mode: mode.to_string(),
                url: first_link(&block, base_url),
                registration_url: None,
            })
        })
        .collect()
}

/// Container blocks (`article`, `div`, `li`) whose class attribute carries
/// the given marker. Non-greedy to the nearest closing tag, which is enough
/// for the flat card markup listing pages use.
fn card_blocks(html: &str, marker: &str) -> Vec<String> {
    let pattern = format!(
        r#"(?is)<(?:article|div|li)[^>]*class="[^"]*{marker}[^"]*"[^>]*>(.*?)</(?:article|div|li)>"#
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|found| found.as_str().to_string()))
        .collect()
}

fn heading_text(block: &str) -> Option<String> {
    let re = Regex::new(r"(?is)<h[1-4][^>]*>(.*?)</h[1-4]>").ok()?;
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|found| strip_tags(found.as_str()))
        .filter(|text| !text.is_empty())
}

fn class_text(block: &str, marker: &str) -> Option<String> {
    let pattern = format!(r#"(?is)<[^>]*class="[^"]*{marker}[^"]*"[^>]*>(.*?)</"#);
    let re = Regex::new(&pattern).ok()?;
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|found| strip_tags(found.as_str()))
        .filter(|text| !text.is_empty())
}

fn first_link(block: &str, base_url: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)<a[^>]*href="([^"]+)""#).ok()?;
    let href = re.captures(block)?.get(1)?.as_str();

    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else {
        Some(format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/')))
    }
}

fn strip_tags(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;

    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{extract_events, extract_jobs, strip_tags};

    const JOBS_PAGE: &str = r#"
        <html><body>
        <article class="job-card">
            <h2>Frontend <b>Developer</b></h2>
            <span class="company-name">TechCorp</span>
            <span class="job-location">Bangalore</span>
            <p class="description">Build delightful &amp; fast interfaces.</p>
            <a href="/jobs/42">details</a>
        </article>
        <div class="job-listing">
            <h3>Data Analyst</h3>
            <span class="company">AnalyticsFirst</span>
        </div>
        <div class="unrelated">ignore me</div>
        </body></html>
    "#;

    const EVENTS_PAGE: &str = r#"
        <html><body>
        <article class="event-card">
            <h2>Resume Workshop</h2>
            <span class="event-date">Sep 20, 2026</span>
            <span class="event-location">Virtual</span>
            <p class="event-description">Hands-on feedback session.</p>
            <span class="organizer">LeadHER</span>
            <a href="https://events.example.com/1">register</a>
        </article>
        </body></html>
    "#;

    #[test]
    fn extracts_job_cards_with_nested_markup() {
        let jobs = extract_jobs(JOBS_PAGE, "https://example.com/jobs");

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Frontend Developer");
        assert_eq!(jobs[0].company, "TechCorp");
        assert_eq!(jobs[0].location, "Bangalore");
        assert_eq!(jobs[0].description, "Build delightful & fast interfaces.");
        assert_eq!(jobs[0].url.as_deref(), Some("https://example.com/jobs/jobs/42"));

        assert_eq!(jobs[1].title, "Data Analyst");
        assert_eq!(jobs[1].company, "AnalyticsFirst");
        assert_eq!(jobs[1].location, "Various Locations", "missing fields use placeholders");
    }

    #[test]
    fn extracts_event_cards_and_infers_mode() {
        let events = extract_events(EVENTS_PAGE, "https://events.example.com");

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Resume Workshop");
        assert_eq!(event.date, "Sep 20, 2026");
        assert_eq!(event.organizer, "LeadHER");
        assert_eq!(event.mode, "online");
        assert_eq!(event.url.as_deref(), Some("https://events.example.com/1"));
    }

    #[test]
    fn pages_without_cards_extract_nothing() {
        assert!(extract_jobs("<html><body><p>maintenance</p></body></html>", "x").is_empty());
        assert!(extract_events("<html></html>", "x").is_empty());
    }

    #[test]
    fn tag_stripping_flattens_whitespace_and_entities() {
        assert_eq!(strip_tags("  <b>Senior</b>\n  Engineer &amp; Lead "), "Senior Engineer & Lead");
    }
}
