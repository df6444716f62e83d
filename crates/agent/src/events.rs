use regex::Regex;

use asha_core::text::truncate_at_word;
use asha_core::EventRecord;

const EVENT_KEYWORDS: &[&str] = &[
    "event",
    "webinar",
    "workshop",
    "conference",
    "meetup",
    "seminar",
    "session",
    "talk",
    "panel",
    "discussion",
    "networking",
];

const EVENT_TYPES: &[&str] = &["webinar", "workshop", "conference", "meetup", "networking", "panel"];

const MODE_LOCATIONS: &[&str] = &["virtual", "online", "in-person", "remote", "hybrid"];

pub fn is_event_query(message: &str) -> bool {
    let lower = message.to_lowercase();
    EVENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn extract_event_type(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    EVENT_TYPES.iter().find(|kind| lower.contains(*kind)).map(|kind| (*kind).to_string())
}

/// Location is either an "in <place>" phrase or an attendance-mode word;
/// the mode word wins when both appear.
pub fn extract_event_location(message: &str) -> Option<String> {
    let lower = message.to_lowercase();

    let mut location = Regex::new(r"in\s+([a-zA-Z\s]+)")
        .ok()
        .and_then(|re| re.captures(&lower))
        .and_then(|caps| caps.get(1))
        .map(|found| found.as_str().trim().to_string());

    if let Some(mode) = MODE_LOCATIONS.iter().find(|mode| lower.contains(*mode)) {
        location = Some((*mode).to_string());
    }

    location
}

/// Substring filtering over the event records: attendance mode and location
/// must contain their filters, and a free-text query must appear in the
/// title, description, or organizer. Results are capped at `limit`.
pub fn search_events(
    events: &[EventRecord],
    query: Option<&str>,
    event_type: Option<&str>,
    location: Option<&str>,
    limit: usize,
) -> Vec<EventRecord> {
    if events.is_empty() {
        return Vec::new();
    }

    if query.is_none() && event_type.is_none() && location.is_none() {
        return events.iter().take(limit).cloned().collect();
    }

    let mut matched = Vec::new();
    for event in events {
        if let Some(event_type) = event_type {
            let event_type = event_type.to_lowercase();
            let mode_match = event.mode.to_lowercase().contains(&event_type);
            let title_match = event.title.to_lowercase().contains(&event_type);
            if !mode_match && !title_match {
                continue;
            }
        }

        if let Some(location) = location {
            if !event.location.to_lowercase().contains(&location.to_lowercase()) {
                continue;
            }
        }

        if let Some(query) = query {
            let query = query.to_lowercase();
            let fields = [&event.title, &event.description, &event.organizer];
            if !fields.iter().any(|field| field.to_lowercase().contains(&query)) {
                continue;
            }
        }

        matched.push(event.clone());
        if matched.len() >= limit {
            break;
        }
    }

    matched
}

pub fn format_event_list(events: &[EventRecord]) -> String {
    if events.is_empty() {
        return "I couldn't find any events matching your criteria. Please try different \
                search terms."
            .to_string();
    }

    let mut response =
        String::from("Here are some upcoming events that might interest you:\n\n");

    for (index, event) in events.iter().take(5).enumerate() {
        response.push_str(&format!("{}. {}\n", index + 1, event.title));
        response.push_str(&format!("   Date: {}\n", placeholder(&event.date, "TBD")));
        response.push_str(&format!(
            "   Location: {}\n",
            placeholder(&event.location, "Not specified")
        ));
        response.push_str(&format!("   Organizer: {}\n", placeholder(&event.organizer, "TBD")));
        response.push_str(&format!("   {}\n\n", truncate_at_word(&event.description, 100)));
    }

    response.push_str(
        "You can register for any of these through the events portal - hope to see you there!",
    );
    response
}

fn placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
