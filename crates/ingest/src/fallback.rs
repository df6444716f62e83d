use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use asha_core::{EventRecord, JobRecord, MentorshipRecord};

/// Bundled job listings used whenever the live site cannot be scraped.
pub fn sample_jobs() -> Vec<JobRecord> {
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let entries = [
        (
            "job-1",
            "Frontend Developer",
            "TechCorp India",
            "Bangalore (Remote)",
            "We're looking for a skilled frontend developer to build user interfaces and \
             implement responsive designs.",
            "3+ years of experience with React, HTML, CSS, and JavaScript.",
        ),
        (
            "job-2",
            "Marketing Manager",
            "Global Marketing Solutions",
            "Mumbai",
            "Lead campaigns, analyze market trends, and develop marketing strategies for our \
             clients.",
            "5+ years of marketing experience and strong communication skills.",
        ),
        (
            "job-3",
            "Data Analyst",
            "AnalyticsFirst",
            "Hyderabad (Hybrid)",
            "Interpret data, analyze results, and provide ongoing reports to drive business \
             decisions.",
            "Experience with SQL, Excel, and data visualization tools.",
        ),
        (
            "job-4",
            "HR Manager",
            "People Solutions",
            "Delhi",
            "Lead our HR department in recruitment, policy, and employee development programs.",
            "7+ years of HR experience and excellent interpersonal skills.",
        ),
        (
            "job-5",
            "Backend Developer",
            "CloudSystems",
            "Remote",
            "Develop server-side logic, maintain high-performance applications, and integrate \
             with frontend components.",
            "Experience with API development and database design; cloud experience is a plus.",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, title, company, location, description, requirements)| JobRecord {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            requirements: requirements.to_string(),
            date_posted: Some(today.clone()),
            ..JobRecord::default()
        })
        .collect()
}

const EVENT_TYPES: &[&str] =
    &["Workshop", "Webinar", "Conference", "Networking", "Panel Discussion"];

const TOPICS: &[&str] = &[
    "Women in Leadership",
    "Career Advancement",
    "Tech Skills",
    "Work-Life Balance",
    "Professional Development",
    "Entrepreneurship",
    "Financial Literacy",
    "Mentorship",
    "Resume Building",
    "Interview Skills",
];

const LOCATIONS: &[&str] =
    &["Virtual", "Online", "Mumbai", "Delhi", "Bangalore", "Hybrid", "Chennai", "Hyderabad"];

const ORGANIZERS: &[&str] =
    &["Herkey", "JobsForHer", "WomenInTech", "LeadHER", "TechLadies", "SheCodes"];

/// Generated upcoming events used whenever the live site cannot be scraped.
/// Dates land 1-13 weeks out so the listings always look current.
pub fn sample_events() -> Vec<EventRecord> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (1..=20)
        .map(|index| {
            let event_type = EVENT_TYPES.choose(&mut rng).copied().unwrap_or("Workshop");
            let topic = TOPICS.choose(&mut rng).copied().unwrap_or("Career Advancement");
            let location = LOCATIONS.choose(&mut rng).copied().unwrap_or("Virtual");
            let organizer = ORGANIZERS.choose(&mut rng).copied().unwrap_or("Herkey");
            let date = now + Duration::days(rng.gen_range(7..=90));
            let is_virtual = matches!(location, "Virtual" | "Online");

            EventRecord {
                id: format!("event-{index}"),
                title: format!("{event_type}: {topic}"),
                date: date.format("%b %d, %Y").to_string(),
                location: location.to_string(),
                description: format!(
                    "Join us for this {} on {topic}. Learn from industry experts and connect \
                     with peers.",
                    event_type.to_lowercase()
                ),
                organizer: organizer.to_string(),
                mode: if is_virtual { "online" } else { "in-person" }.to_string(),
                url: Some(format!("https://events.herkey.com/events/{index}")),
                registration_url: Some(format!("https://events.herkey.com/events/{index}/register")),
            }
        })
        .collect()
}

/// Bundled mentorship programs. There is no live source for these; the
/// seed command writes them so the mentorship search path has data.
pub fn sample_mentorships() -> Vec<MentorshipRecord> {
    let entries = [
        (
            "mentorship-1",
            "Tech Leadership Circle",
            "Priya Sharma",
            "engineering management, career transitions",
            "Monthly 1:1 sessions for women moving into engineering leadership roles.",
        ),
        (
            "mentorship-2",
            "Product Career Kickstart",
            "Anjali Rao",
            "product management, interviewing",
            "Structured guidance for breaking into product roles, from resume to offer.",
        ),
        (
            "mentorship-3",
            "Returning to Work",
            "Meera Iyer",
            "career restart, confidence building",
            "Support for professionals returning after a career break.",
        ),
        (
            "mentorship-4",
            "Data Careers Guild",
            "Sunita Patel",
            "analytics, machine learning, portfolio building",
            "Project-based mentoring for aspiring data analysts and scientists.",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, title, mentor, expertise, description)| MentorshipRecord {
            id: id.to_string(),
            title: title.to_string(),
            mentor: mentor.to_string(),
            expertise: expertise.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{sample_events, sample_jobs, sample_mentorships};

    #[test]
    fn sample_jobs_are_complete_records() {
        let jobs = sample_jobs();
        assert_eq!(jobs.len(), 5);
        for job in &jobs {
            assert!(!job.id.is_empty());
            assert!(!job.title.is_empty());
            assert!(!job.description.is_empty());
            assert!(job.date_posted.is_some());
        }
    }

    #[test]
    fn sample_events_have_unique_ids_and_modes() {
        let events = sample_events();
        assert_eq!(events.len(), 20);

        let mut ids: Vec<&str> = events.iter().map(|event| event.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20, "event ids must be unique for merge dedup");

        for event in &events {
            assert!(matches!(event.mode.as_str(), "online" | "in-person"));
        }
    }

    #[test]
    fn sample_mentorships_name_their_mentors() {
        let mentorships = sample_mentorships();
        assert_eq!(mentorships.len(), 4);
        for mentorship in &mentorships {
            assert!(!mentorship.mentor.is_empty());
            assert!(!mentorship.expertise.is_empty());
        }
    }
}
