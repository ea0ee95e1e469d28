use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::TrackerResult;
use crate::model::goals::Goals;
use crate::model::lesson::{default_lessons, Lesson};
use crate::model::study_log::{generate_log_id, StoredStudyLog, StudyLog};
use crate::repository::traits::KeyValueStore;

pub const LOGS_KEY: &str = "kpss_logs";
pub const LESSONS_KEY: &str = "kpss_lessons";
pub const GOALS_KEY: &str = "kpss_goals";

/// Result of reading the log collection. `repaired` counts ids that had to
/// be regenerated because they were missing or duplicated; `dropped` counts
/// entries that could not be read as a study log at all.
#[derive(Debug, Default)]
pub struct LoadedLogs {
    pub logs: Vec<StudyLog>,
    pub repaired: usize,
    pub dropped: usize,
}

impl LoadedLogs {
    /// Whether the stored collection differs from what was loaded.
    pub fn needs_rewrite(&self) -> bool {
        self.repaired > 0 || self.dropped > 0
    }
}

pub fn load_logs<S: KeyValueStore>(store: &S) -> TrackerResult<LoadedLogs> {
    let Some(value) = read_json(store, LOGS_KEY)? else {
        return Ok(LoadedLogs::default());
    };
    let Value::Array(entries) = value else {
        warn!(key = LOGS_KEY, "stored logs are not an array, starting empty");
        return Ok(LoadedLogs::default());
    };

    // Entries are read one by one so a bad record only costs itself
    let mut stored = Vec::with_capacity(entries.len());
    let mut dropped = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StoredStudyLog>(entry) {
            Ok(log) => stored.push(log),
            Err(e) => {
                warn!(key = LOGS_KEY, index, error = %e, "skipping malformed study log");
                dropped += 1;
            }
        }
    }

    let (logs, repaired) = repair_ids(stored);
    if repaired > 0 {
        info!(repaired, "regenerated missing or duplicate log ids");
    }
    Ok(LoadedLogs { logs, repaired, dropped })
}

pub fn load_lessons<S: KeyValueStore>(store: &S) -> TrackerResult<Vec<Lesson>> {
    let Some(value) = read_json(store, LESSONS_KEY)? else {
        return Ok(default_lessons());
    };
    match serde_json::from_value::<Vec<Lesson>>(value) {
        Ok(lessons) if !lessons.is_empty() => Ok(lessons),
        Ok(_) => {
            warn!(key = LESSONS_KEY, "stored lessons are empty, using defaults");
            Ok(default_lessons())
        }
        Err(e) => {
            warn!(key = LESSONS_KEY, error = %e, "stored lessons are malformed, using defaults");
            Ok(default_lessons())
        }
    }
}

pub fn load_goals<S: KeyValueStore>(store: &S) -> TrackerResult<Goals> {
    let Some(value) = read_json(store, GOALS_KEY)? else {
        return Ok(Goals::default());
    };
    if !value.is_object() {
        warn!(key = GOALS_KEY, "stored goals are not an object, using defaults");
        return Ok(Goals::default());
    }
    match serde_json::from_value::<Goals>(value) {
        Ok(goals) => Ok(goals),
        Err(e) => {
            warn!(key = GOALS_KEY, error = %e, "stored goals are malformed, using defaults");
            Ok(Goals::default())
        }
    }
}

pub fn save_logs<S: KeyValueStore>(store: &S, logs: &[StudyLog]) -> TrackerResult<()> {
    write_json(store, LOGS_KEY, logs)
}

pub fn save_lessons<S: KeyValueStore>(store: &S, lessons: &[Lesson]) -> TrackerResult<()> {
    write_json(store, LESSONS_KEY, lessons)
}

pub fn save_goals<S: KeyValueStore>(store: &S, goals: &Goals) -> TrackerResult<()> {
    write_json(store, GOALS_KEY, goals)
}

/// Reads a key and parses it as JSON. Unparseable content is reported and
/// treated like an absent key.
fn read_json<S: KeyValueStore>(store: &S, key: &str) -> TrackerResult<Option<Value>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "stored value is not valid JSON, ignoring it");
            Ok(None)
        }
    }
}

fn write_json<S: KeyValueStore, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> TrackerResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    store.set(key, &content)?;
    debug!(key, "persisted collection");
    Ok(())
}

fn repair_ids(stored: Vec<StoredStudyLog>) -> (Vec<StudyLog>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(stored.len());
    let mut repaired = 0;
    let mut logs = Vec::with_capacity(stored.len());

    for entry in stored {
        let id = match entry.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && !seen.contains(id) => id.to_string(),
            _ => {
                repaired += 1;
                unique_id(&seen)
            }
        };
        seen.insert(id.clone());
        logs.push(entry.into_log(id));
    }

    (logs, repaired)
}

pub(crate) fn unique_id(taken: &HashSet<String>) -> String {
    loop {
        let id = generate_log_id();
        if !taken.contains(&id) {
            return id;
        }
    }
}
