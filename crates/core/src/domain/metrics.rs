use chrono::NaiveDate;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Job,
    FilteredJob,
    Event,
    Mentorship,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::FilteredJob => "filtered_job",
            Self::Event => "event",
            Self::Mentorship => "mentorship",
        }
    }
}

/// One row per calendar date; counters only ever increase.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DailyMetrics {
    pub total_interactions: i64,
    pub job_searches: i64,
    pub filtered_job_searches: i64,
    pub event_searches: i64,
    pub mentorship_searches: i64,
    pub bias_detections: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricsRow {
    pub date: NaiveDate,
    pub counters: DailyMetrics,
}
