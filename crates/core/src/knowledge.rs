use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::record::{EventRecord, JobRecord, KnowledgeDoc, KnowledgeKind, MentorshipRecord};

pub const JOBS_FILE: &str = "jobs.json";
pub const EVENTS_FILE: &str = "events.json";
pub const MENTORSHIPS_FILE: &str = "mentorships.json";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("could not create data directory `{path}`: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("could not write knowledge file `{path}`: {source}")]
    WriteFile { path: PathBuf, source: io::Error },
    #[error("could not serialize knowledge records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The in-memory knowledge base. Records are loaded wholesale at startup;
/// there is no index beyond the vectors themselves.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    pub jobs: Vec<JobRecord>,
    pub events: Vec<EventRecord>,
    pub mentorships: Vec<MentorshipRecord>,
}

impl KnowledgeBase {
    /// Load every knowledge file from `data_dir`. A missing file is replaced
    /// by an empty one and loads as an empty set; malformed JSON loads as an
    /// empty set with a logged error. Loading never fails the process.
    pub fn load_dir(data_dir: &Path) -> Result<Self, KnowledgeError> {
        fs::create_dir_all(data_dir)
            .map_err(|source| KnowledgeError::CreateDir { path: data_dir.to_path_buf(), source })?;

        Ok(Self {
            jobs: load_records(&data_dir.join(JOBS_FILE))?,
            events: load_records(&data_dir.join(EVENTS_FILE))?,
            mentorships: load_records(&data_dir.join(MENTORSHIPS_FILE))?,
        })
    }

    pub fn len(&self) -> usize {
        self.jobs.len() + self.events.len() + self.mentorships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten every record into the retrieval view.
    pub fn documents(&self) -> Vec<KnowledgeDoc> {
        let mut docs = Vec::with_capacity(self.len());
        docs.extend(self.jobs.iter().cloned().map(KnowledgeDoc::Job));
        docs.extend(self.events.iter().cloned().map(KnowledgeDoc::Event));
        docs.extend(self.mentorships.iter().cloned().map(KnowledgeDoc::Mentorship));
        docs
    }

    pub fn count_of(&self, kind: KnowledgeKind) -> usize {
        match kind {
            KnowledgeKind::Job => self.jobs.len(),
            KnowledgeKind::Event => self.events.len(),
            KnowledgeKind::Mentorship => self.mentorships.len(),
        }
    }
}

fn load_records<T: DeserializeOwned + Serialize>(path: &Path) -> Result<Vec<T>, KnowledgeError> {
    if !path.exists() {
        warn!(path = %path.display(), "knowledge file missing, creating an empty one");
        write_records::<T>(path, &[])?;
        return Ok(Vec::new());
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to read knowledge file");
            return Ok(Vec::new());
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(records) => {
            debug!(path = %path.display(), count = records.len(), "loaded knowledge file");
            Ok(records)
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to decode knowledge file");
            Ok(Vec::new())
        }
    }
}

/// Write records atomically: serialize to a sibling temp file, then rename.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), KnowledgeError> {
    let payload = serde_json::to_string_pretty(records)?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, payload)
        .map_err(|source| KnowledgeError::WriteFile { path: temp_path.clone(), source })?;
    fs::rename(&temp_path, path)
        .map_err(|source| KnowledgeError::WriteFile { path: path.to_path_buf(), source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{write_records, KnowledgeBase, EVENTS_FILE, JOBS_FILE, MENTORSHIPS_FILE};
    use crate::domain::record::JobRecord;

    #[test]
    fn missing_files_are_created_empty() {
        let dir = TempDir::new().expect("tempdir");

        let kb = KnowledgeBase::load_dir(dir.path()).expect("load");

        assert!(kb.is_empty());
        for file in [JOBS_FILE, EVENTS_FILE, MENTORSHIPS_FILE] {
            let raw = fs::read_to_string(dir.path().join(file)).expect("file created");
            assert_eq!(raw.trim(), "[]");
        }
    }

    #[test]
    fn malformed_json_loads_as_empty_set() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(JOBS_FILE), "{ not json ]").expect("write");

        let kb = KnowledgeBase::load_dir(dir.path()).expect("load");

        assert!(kb.jobs.is_empty());
    }

    #[test]
    fn written_records_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let jobs = vec![JobRecord {
            id: "job-1".to_string(),
            title: "Data Analyst".to_string(),
            company: "AnalyticsFirst".to_string(),
            ..JobRecord::default()
        }];

        write_records(&dir.path().join(JOBS_FILE), &jobs).expect("write");
        let kb = KnowledgeBase::load_dir(dir.path()).expect("load");

        assert_eq!(kb.jobs, jobs);
        assert_eq!(kb.documents().len(), 1);
    }
}
