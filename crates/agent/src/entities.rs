use std::collections::BTreeMap;

use regex::Regex;

use asha_core::session::EntityKind;

const JOB_ROLE_PATTERN: &str = r"\b(developer|engineer|designer|manager|analyst|consultant|director|specialist|coordinator|administrator|assistant|technician|officer)\b";

const LOCATION_PATTERN: &str = r"\b(bangalore|bengaluru|mumbai|delhi|hyderabad|chennai|kolkata|pune|ahmedabad|jaipur|lucknow|gurgaon|noida|remote|work from home|wfh)\b";

const SKILL_PATTERN: &str = r"\b(python|java|javascript|html|css|react|angular|node|sql|database|communication|leadership|project management|marketing|sales|design|analytics|machine learning|cloud)\b";

const INDUSTRY_PATTERN: &str = r"\b(technology|finance|healthcare|education|retail|manufacturing|media|hospitality|government|non-profit|consulting|engineering|pharmaceutical|telecommunications|energy)\b";

const EVENT_TYPE_PATTERN: &str = r"\b(workshop|seminar|conference|webinar|meetup|hackathon|training|bootcamp|career fair|networking)\b";

/// Regex entity extractor over the lowercased message. Values are returned
/// in match order, duplicates included; deduplication happens when they are
/// merged into the session context.
pub struct EntityExtractor {
    extractors: Vec<(EntityKind, Regex)>,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        let table = [
            (EntityKind::JobRole, JOB_ROLE_PATTERN),
            (EntityKind::Location, LOCATION_PATTERN),
            (EntityKind::Skill, SKILL_PATTERN),
            (EntityKind::Industry, INDUSTRY_PATTERN),
            (EntityKind::EventType, EVENT_TYPE_PATTERN),
        ];

        Self {
            extractors: table
                .into_iter()
                .filter_map(|(kind, pattern)| Regex::new(pattern).ok().map(|re| (kind, re)))
                .collect(),
        }
    }

    pub fn extract(&self, message: &str) -> BTreeMap<EntityKind, Vec<String>> {
        let lower = message.to_lowercase();
        let mut entities = BTreeMap::new();

        for (kind, pattern) in &self.extractors {
            let values: Vec<String> =
                pattern.find_iter(&lower).map(|found| found.as_str().to_string()).collect();
            if !values.is_empty() {
                entities.insert(*kind, values);
            }
        }

        entities
    }
}
