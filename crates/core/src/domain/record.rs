use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnowledgeKind {
    Job,
    Event,
    Mentorship,
}

impl KnowledgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Event => "event",
            Self::Mentorship => "mentorship",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub skills: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organizer: String,
    /// Attendance mode as published by the source, e.g. `online` or `in-person`.
    #[serde(default, rename = "type")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MentorshipRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub mentor: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub description: String,
}

impl JobRecord {
    pub fn search_text(&self) -> String {
        let mut text = format!(
            "{} {} {} {} {}",
            self.title, self.company, self.description, self.location, self.requirements
        );
        for optional in [&self.work_mode, &self.job_type, &self.experience] {
            if let Some(value) = optional {
                text.push(' ');
                text.push_str(value);
            }
        }
        if !self.skills.is_empty() {
            text.push(' ');
            text.push_str(&self.skills.join(" "));
        }
        text
    }
}

impl EventRecord {
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.title, self.description, self.date, self.location, self.organizer
        )
    }
}

impl MentorshipRecord {
    pub fn search_text(&self) -> String {
        format!("{} {} {} {}", self.title, self.mentor, self.description, self.expertise)
    }
}

/// A retrieval view over any knowledge record.
#[derive(Clone, Debug, PartialEq)]
pub enum KnowledgeDoc {
    Job(JobRecord),
    Event(EventRecord),
    Mentorship(MentorshipRecord),
}

impl KnowledgeDoc {
    pub fn kind(&self) -> KnowledgeKind {
        match self {
            Self::Job(_) => KnowledgeKind::Job,
            Self::Event(_) => KnowledgeKind::Event,
            Self::Mentorship(_) => KnowledgeKind::Mentorship,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Job(job) => &job.title,
            Self::Event(event) => &event.title,
            Self::Mentorship(mentorship) => &mentorship.title,
        }
    }

    pub fn search_text(&self) -> String {
        match self {
            Self::Job(job) => job.search_text(),
            Self::Event(event) => event.search_text(),
            Self::Mentorship(mentorship) => mentorship.search_text(),
        }
    }
}

/// Sources publish `skills` both as a list and as a comma-joined string.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<String>),
        Single(String),
    }

    match StringOrList::deserialize(deserializer)? {
        StringOrList::List(values) => Ok(values),
        StringOrList::Single(value) => Ok(value
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::{EventRecord, JobRecord, KnowledgeDoc, KnowledgeKind};

    #[test]
    fn job_search_text_includes_optional_fields() {
        let job: JobRecord = serde_json::from_str(
            r#"{
                "id": "job-1",
                "title": "Frontend Developer",
                "company": "TechCorp",
                "location": "Bangalore (Remote)",
                "description": "Build user interfaces.",
                "requirements": "React experience.",
                "work_mode": "remote",
                "skills": ["react", "css"]
            }"#,
        )
        .expect("parse job");

        let text = job.search_text();
        assert!(text.contains("Frontend Developer"));
        assert!(text.contains("remote"));
        assert!(text.contains("react css"));
    }

    #[test]
    fn skills_accept_comma_joined_string() {
        let job: JobRecord = serde_json::from_str(
            r#"{"title": "Analyst", "skills": "sql, excel , python"}"#,
        )
        .expect("parse job");

        assert_eq!(job.skills, vec!["sql", "excel", "python"]);
    }

    #[test]
    fn event_mode_maps_from_type_field() {
        let event: EventRecord = serde_json::from_str(
            r#"{"id": "event-1", "title": "Tech Talk", "type": "online"}"#,
        )
        .expect("parse event");

        assert_eq!(event.mode, "online");
        assert_eq!(KnowledgeDoc::Event(event).kind(), KnowledgeKind::Event);
    }
}
