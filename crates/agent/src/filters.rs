use rand::seq::SliceRandom;

use asha_core::JobRecord;

const LOCATIONS: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Bengaluru", "Hyderabad", "Chennai", "Kolkata", "Pune",
    "Ahmedabad", "Jaipur", "Gurgaon", "Noida",
];

const COMPANIES: &[&str] =
    &["TechCorp", "ServiceFirst", "DataInsights", "CloudSystems", "DigitalEdge"];

const POSITIONS: &[&str] = &["developer", "manager", "analyst", "engineer", "designer"];

/// Terms that mark a job query as refined (work mode or employment type);
/// these flip a plain job search into a filtered one for metrics purposes.
pub const REFINEMENT_TERMS: &[&str] =
    &["remote", "wfh", "hybrid", "in-office", "full-time", "part-time"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobFilters {
    pub position: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

impl JobFilters {
    pub fn has_filters(&self) -> bool {
        self.position.is_some() || self.company.is_some() || self.location.is_some()
    }
}

/// Detect position / company / location filters from fixed vocabularies.
/// First match per category wins.
pub fn detect_job_filters(message: &str) -> JobFilters {
    let lower = message.to_lowercase();
    let mut filters = JobFilters::default();

    filters.location =
        LOCATIONS.iter().find(|location| lower.contains(&location.to_lowercase())).map(|location| (*location).to_string());

    filters.company =
        COMPANIES.iter().find(|company| lower.contains(&company.to_lowercase())).map(|company| (*company).to_string());

    filters.position = POSITIONS
        .iter()
        .find(|position| lower.contains(*position))
        .map(|position| capitalize(position));

    filters
}

/// Apply detected filters conjunctively. Without filters, or when nothing
/// survives them, a shuffled sample of the input is returned so the user
/// always sees something close.
pub fn filter_jobs(jobs: &[JobRecord], filters: &JobFilters) -> Vec<JobRecord> {
    let mut rng = rand::thread_rng();

    if !filters.has_filters() {
        let mut sample: Vec<JobRecord> = jobs.to_vec();
        sample.shuffle(&mut rng);
        sample.truncate(5);
        return sample;
    }

    let mut matched: Vec<JobRecord> = jobs
        .iter()
        .filter(|job| {
            let position_ok = filters
                .position
                .as_ref()
                .map(|position| job.title.to_lowercase().contains(&position.to_lowercase()))
                .unwrap_or(true);
            let company_ok = filters
                .company
                .as_ref()
                .map(|company| job.company.to_lowercase().contains(&company.to_lowercase()))
                .unwrap_or(true);
            let location_ok = filters
                .location
                .as_ref()
                .map(|location| job.location.to_lowercase().contains(&location.to_lowercase()))
                .unwrap_or(true);
            position_ok && company_ok && location_ok
        })
        .cloned()
        .collect();

    if matched.is_empty() {
        let mut sample: Vec<JobRecord> = jobs.to_vec();
        sample.shuffle(&mut rng);
        sample.truncate(3);
        return sample;
    }

    matched.shuffle(&mut rng);
    matched.truncate(5);
    matched
}

pub fn format_filter_summary(filters: &JobFilters) -> String {
    if !filters.has_filters() {
        return String::new();
    }

    let mut parts = Vec::new();
    if let Some(position) = &filters.position {
        parts.push(format!("{position} positions"));
    }
    if let Some(company) = &filters.company {
        parts.push(format!("at {company}"));
    }
    if let Some(location) = &filters.location {
        parts.push(format!("in {location}"));
    }

    format!("Found {}.", parts.join(", "))
}

pub fn has_refinement_terms(message: &str) -> bool {
    let lower = message.to_lowercase();
    REFINEMENT_TERMS.iter().any(|term| lower.contains(term))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
