use crate::commands::CommandResult;
use asha_core::config::{AppConfig, LoadOptions};
use asha_core::knowledge::{self, EVENTS_FILE, JOBS_FILE, MENTORSHIPS_FILE};
use asha_ingest::fallback;

/// Write the bundled sample datasets into the configured data directory.
/// Existing knowledge files are overwritten; seeding is a reset, not a merge.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let data_dir = &config.knowledge.data_dir;
    if let Err(error) = std::fs::create_dir_all(data_dir) {
        return CommandResult::failure(
            "seed",
            "data_dir",
            format!("could not create data directory `{}`: {error}", data_dir.display()),
            3,
        );
    }

    let jobs = fallback::sample_jobs();
    let events = fallback::sample_events();
    let mentorships = fallback::sample_mentorships();

    let writes = [
        knowledge::write_records(&data_dir.join(JOBS_FILE), &jobs).err(),
        knowledge::write_records(&data_dir.join(EVENTS_FILE), &events).err(),
        knowledge::write_records(&data_dir.join(MENTORSHIPS_FILE), &mentorships).err(),
    ];

    if let Some(error) = writes.into_iter().flatten().next() {
        return CommandResult::failure("seed", "knowledge_write", error.to_string(), 4);
    }

    CommandResult::success(
        "seed",
        format!(
            "seeded {} jobs, {} events, {} mentorships into `{}`",
            jobs.len(),
            events.len(),
            mentorships.len(),
            data_dir.display()
        ),
    )
}
