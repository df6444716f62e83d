use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use asha_core::text::truncate_at_word;
use asha_core::{KnowledgeDoc, KnowledgeKind};

use crate::filters::{self, JobFilters};
use crate::retrieval::ScoredDoc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryType {
    Job,
    FilteredJob,
    Event,
    Mentorship,
    General,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::FilteredJob => "filtered_job",
            Self::Event => "event",
            Self::Mentorship => "mentorship",
            Self::General => "general",
        }
    }
}

const FAREWELL_PATTERN: &str =
    r"\b(goodbye|bye|farewell|see you|talk later|have a good day|thank you|thanks)\b";

const EVENT_QUERY_PATTERNS: &[&str] = &[
    r"\b(event|webinar|workshop|conference|meetup|seminar)s?\b",
    r"\b(upcoming|scheduled) (events|webinars|workshops|conferences|meetups)\b",
];

const FILTERED_JOB_PATTERNS: &[&str] = &[
    r"\b(jobs|positions|opportunities) (in|at|near|for|with)\b",
    r"\b(remote|wfh|work from home|hybrid|on-site|in-office) (jobs|positions|work)\b",
    r"\b(full-time|part-time|contract|freelance|internship) (jobs|positions|work)\b",
    r"\b(entry-level|junior|mid-level|senior|lead) (jobs|positions|roles)\b",
];

const JOB_PATTERN: &str =
    r"\b(job|career|position|opening|vacancy|work|employment|hiring|opportunity)\b";

const MENTORSHIP_PATTERN: &str = r"\b(mentor|mentorship|mentoring|guidance|coaching)\b";

const WELCOME_MESSAGES: &[&str] = &[
    "I'm Asha, your career assistant. How can I support your professional journey today?",
    "Welcome! I'm Asha, and I'm here to help you find opportunities that match your career \
     goals - jobs, events, or mentorship programs.",
    "It's lovely to meet you! I'm Asha, your career assistant. Ask me about job listings, \
     upcoming events, or mentorship opportunities.",
    "Glad you're here! I'm Asha, and I'd love to help you grow professionally. What are you \
     looking for today?",
];

const FAREWELL_MESSAGES: &[&str] = &[
    "Thank you for chatting with me today! I'm here whenever you need career guidance.",
    "It was lovely assisting you! Wishing you success on your career journey - come back \
     anytime.",
    "I've enjoyed our conversation! Have a wonderful day, and reach out whenever you need \
     more career resources.",
];

const CARE_REMINDERS: &[&str] = &[
    "Remember to stay hydrated as you pursue your career goals!",
    "Quick reminder: short breaks improve productivity. Maybe stretch for a moment?",
    "Your wellbeing matters - don't forget to take a deep breath between tasks.",
    "Self-care tip: rest your eyes occasionally while job searching.",
];

const NO_RESULTS_GENERAL: &str = "I couldn't find specific information related to your query. \
     I can help you discover job opportunities, upcoming events, mentorship programs, or \
     career resources. What would you like to explore?";

/// Identify how to present the results: explicit event/job phrasing first,
/// then filter detection, then the majority kind of the retrieved documents.
pub fn identify_query_type(message: &str, results: &[ScoredDoc]) -> QueryType {
    let lower = message.to_lowercase();

    if EVENT_QUERY_PATTERNS.iter().any(|pattern| matches(pattern, &lower)) {
        return QueryType::Event;
    }

    if FILTERED_JOB_PATTERNS.iter().any(|pattern| matches(pattern, &lower))
        && filters::detect_job_filters(message).has_filters()
    {
        return QueryType::FilteredJob;
    }

    if matches(MENTORSHIP_PATTERN, &lower) {
        return QueryType::Mentorship;
    }

    if matches(JOB_PATTERN, &lower) {
        if filters::detect_job_filters(message).has_filters() {
            return QueryType::FilteredJob;
        }
        return QueryType::Job;
    }

    majority_kind(results).map_or(QueryType::General, |kind| match kind {
        KnowledgeKind::Job => QueryType::Job,
        KnowledgeKind::Event => QueryType::Event,
        KnowledgeKind::Mentorship => QueryType::Mentorship,
    })
}

pub fn is_farewell(message: &str) -> bool {
    matches(FAREWELL_PATTERN, &message.to_lowercase())
}

pub fn welcome_message() -> String {
    choose(WELCOME_MESSAGES)
}

pub fn farewell_message() -> String {
    format!("{} {}", choose(CARE_REMINDERS), choose(FAREWELL_MESSAGES))
}

/// Roughly one response in five carries a self-care postscript.
pub fn maybe_care_reminder() -> Option<String> {
    let mut rng = rand::thread_rng();
    rng.gen_bool(0.2).then(|| format!("\n\n{}", choose(CARE_REMINDERS)))
}

pub fn format_results(
    query_type: QueryType,
    results: &[ScoredDoc],
    filters: &JobFilters,
) -> String {
    if results.is_empty() {
        return no_results_message(query_type);
    }

    match query_type {
        QueryType::Job => format_jobs(results),
        QueryType::FilteredJob => format_filtered_jobs(results, filters),
        QueryType::Event => format_events(results),
        QueryType::Mentorship => format_mentorships(results),
        QueryType::General => format_general(results),
    }
}

pub fn no_results_message(query_type: QueryType) -> String {
    match query_type {
        QueryType::Job => "I couldn't find any job listings matching your criteria. Would you \
             like to explore other job categories, or check out upcoming career events instead?"
            .to_string(),
        QueryType::FilteredJob => "I couldn't find any job listings matching your specific \
             filters. Want to broaden the search? I can look in different locations, work \
             modes, or skill areas."
            .to_string(),
        QueryType::Event => "I couldn't find any events matching your criteria. Would you like \
             to hear about events in a different category, or explore mentorship opportunities?"
            .to_string(),
        QueryType::Mentorship => "I couldn't find mentorship programs matching your criteria. \
             Would you like to explore other mentorship areas, or career events where you \
             might meet potential mentors?"
            .to_string(),
        QueryType::General => NO_RESULTS_GENERAL.to_string(),
    }
}

fn format_jobs(results: &[ScoredDoc]) -> String {
    let mut response =
        String::from("I found these job opportunities that might interest you:\n\n");

    let mut index = 0;
    for scored in results {
        let KnowledgeDoc::Job(job) = &scored.doc else { continue };
        if index >= 3 {
            break;
        }
        index += 1;
        response.push_str(&format!("{index}. {} at {}\n", job.title, job.company));
        response.push_str(&format!("   Location: {}\n", placeholder(&job.location)));
        response
            .push_str(&format!("   Summary: {}\n\n", truncate_at_word(&job.description, 100)));
    }

    if index == 0 {
        return no_results_message(QueryType::Job);
    }

    response.push_str(
        "Would you like more details about any of these positions? Or shall we refine your \
         search criteria?",
    );
    response
}

fn format_filtered_jobs(results: &[ScoredDoc], filters: &JobFilters) -> String {
    let jobs: Vec<_> = results
        .iter()
        .filter_map(|scored| match &scored.doc {
            KnowledgeDoc::Job(job) => Some(job.clone()),
            _ => None,
        })
        .collect();

    let filtered = filters::filter_jobs(&jobs, filters);
    if filtered.is_empty() {
        return no_results_message(QueryType::FilteredJob);
    }

    let summary = filters::format_filter_summary(filters);
    let mut response = if summary.is_empty() {
        String::from("I found these job opportunities that might interest you:\n\n")
    } else {
        format!("{summary}\n\nHere are some matching opportunities:\n\n")
    };

    for (index, job) in filtered.iter().take(3).enumerate() {
        let mut meta = Vec::new();
        if let Some(work_mode) = &job.work_mode {
            meta.push(work_mode.clone());
        }
        if let Some(job_type) = &job.job_type {
            meta.push(job_type.clone());
        }
        let meta_text =
            if meta.is_empty() { String::new() } else { format!(" ({})", meta.join(", ")) };

        response.push_str(&format!("{}. {} at {}{meta_text}\n", index + 1, job.title, job.company));
        response.push_str(&format!("   Location: {}\n", placeholder(&job.location)));
        if !job.skills.is_empty() {
            let mut skills = job.skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
            if job.skills.len() > 3 {
                skills.push_str("...");
            }
            response.push_str(&format!("   Skills: {skills}\n"));
        }
        response
            .push_str(&format!("   Summary: {}\n\n", truncate_at_word(&job.description, 100)));
    }

    if filters.has_filters() {
        response.push_str(
            "Would you like more details about any of these positions? I can also refine the \
             search further or show more results.",
        );
    } else {
        response.push_str(
            "Would you like to narrow these down? I can filter by location, work mode, job \
             type, or skills.",
        );
    }
    response
}

fn format_events(results: &[ScoredDoc]) -> String {
    let mut response = String::from("Here are some upcoming events that match your interests:\n\n");

    let mut index = 0;
    for scored in results {
        let KnowledgeDoc::Event(event) = &scored.doc else { continue };
        if index >= 3 {
            break;
        }
        index += 1;
        response.push_str(&format!("{index}. {}\n", event.title));
        response.push_str(&format!("   Date: {}\n", placeholder(&event.date)));
        response.push_str(&format!("   Location: {}\n", placeholder(&event.location)));
        response
            .push_str(&format!("   Summary: {}\n\n", truncate_at_word(&event.description, 100)));
    }

    if index == 0 {
        return no_results_message(QueryType::Event);
    }

    response.push_str(
        "Would you like more information about any of these events? I can share registration \
         details if you're interested.",
    );
    response
}

fn format_mentorships(results: &[ScoredDoc]) -> String {
    let mut response = String::from(
        "I found these mentorship opportunities that could help your career growth:\n\n",
    );

    let mut index = 0;
    for scored in results {
        let KnowledgeDoc::Mentorship(program) = &scored.doc else { continue };
        if index >= 3 {
            break;
        }
        index += 1;
        response.push_str(&format!("{index}. {}\n", program.title));
        response.push_str(&format!("   Mentor: {}\n", placeholder(&program.mentor)));
        response.push_str(&format!("   Expertise: {}\n", placeholder(&program.expertise)));
        response
            .push_str(&format!("   Summary: {}\n\n", truncate_at_word(&program.description, 100)));
    }

    if index == 0 {
        return no_results_message(QueryType::Mentorship);
    }

    response.push_str(
        "These mentors can provide valuable guidance for your career journey. Would you like \
         to know more about any of them?",
    );
    response
}

fn format_general(results: &[ScoredDoc]) -> String {
    let mut response = String::from("Here's some information that might be helpful for you:\n\n");

    for (index, scored) in results.iter().take(3).enumerate() {
        let line = match &scored.doc {
            KnowledgeDoc::Job(job) => format!(
                "{}. Job: {} at {}\n   Location: {}\n",
                index + 1,
                job.title,
                job.company,
                placeholder(&job.location)
            ),
            KnowledgeDoc::Event(event) => format!(
                "{}. Event: {}\n   Date: {}\n",
                index + 1,
                event.title,
                placeholder(&event.date)
            ),
            KnowledgeDoc::Mentorship(program) => format!(
                "{}. Mentorship: {}\n   Mentor: {}\n",
                index + 1,
                program.title,
                placeholder(&program.mentor)
            ),
        };
        response.push_str(&line);
    }

    response.push_str(
        "\nWould you like more specific information about any of these? I can provide details \
         on jobs, events, or mentorships.",
    );
    response
}

fn majority_kind(results: &[ScoredDoc]) -> Option<KnowledgeKind> {
    let mut counts: Vec<(KnowledgeKind, usize)> = Vec::new();
    for scored in results {
        let kind = scored.doc.kind();
        match counts.iter_mut().find(|(existing, _)| *existing == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind, 1)),
        }
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(kind, _)| kind)
}

fn matches(pattern: &str, lower_message: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(lower_message)).unwrap_or(false)
}

fn placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not specified"
    } else {
        value
    }
}

fn choose(options: &[&str]) -> String {
    options.choose(&mut rand::thread_rng()).copied().unwrap_or_default().to_string()
}
