//! Read/write access to schedule data and user state.
//!
//! The grid never talks to storage directly; everything it needs comes
//! through [`ScheduleRepository`].

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ScheduleError;
use crate::schedule::{DayIndex, ScheduleContext, Session};

pub trait ScheduleRepository {
    /// Sessions of `day`, cancelled ones excluded. Order within a room is
    /// not guaranteed.
    fn load_uncanceled_sessions_for_day(&self, day: DayIndex) -> Vec<Session>;

    fn read_alarm_session_ids(&self) -> HashSet<String>;

    fn read_highlight_session_ids(&self) -> HashSet<String>;

    fn read_display_day_index(&self) -> DayIndex;

    fn update_display_day_index(&mut self, day: DayIndex);

    /// Rooms, days, version and offset of the current dataset.
    fn read_context(&self) -> Result<ScheduleContext, ScheduleError>;

    fn read_shifts_hash(&self) -> i64;

    fn read_last_shifts_hash(&self) -> i64;

    fn update_last_shifts_hash(&mut self, hash: i64);
}

/// A complete conference dataset as exchanged with the demo shell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    pub rooms: Vec<String>,
    pub days: Vec<NaiveDate>,
    pub sessions: Vec<Session>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse dataset")
    }
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    dataset: Dataset,
    alarms: HashSet<String>,
    highlights: HashSet<String>,
    display_day: Option<DayIndex>,
    shifts_hash: i64,
    last_shifts_hash: i64,
}

impl InMemoryRepository {
    pub fn new(dataset: Dataset) -> Self {
        let alarms = ids_where(&dataset.sessions, |s| s.has_alarm);
        let highlights = ids_where(&dataset.sessions, |s| s.highlight);
        Self {
            dataset,
            alarms,
            highlights,
            ..Self::default()
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Replaces the dataset, as a finished fetch would.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
    }

    pub fn set_alarm(&mut self, session_id: &str, enabled: bool) {
        toggle(&mut self.alarms, session_id, enabled);
    }

    pub fn set_highlight(&mut self, session_id: &str, enabled: bool) {
        toggle(&mut self.highlights, session_id, enabled);
    }

    pub fn set_shifts_hash(&mut self, hash: i64) {
        self.shifts_hash = hash;
    }
}

fn ids_where(sessions: &[Session], predicate: impl Fn(&Session) -> bool) -> HashSet<String> {
    sessions
        .iter()
        .filter(|s| predicate(s))
        .map(|s| s.id.clone())
        .collect()
}

fn toggle(ids: &mut HashSet<String>, session_id: &str, enabled: bool) {
    if enabled {
        ids.insert(session_id.to_string());
    } else {
        ids.remove(session_id);
    }
}

impl ScheduleRepository for InMemoryRepository {
    fn load_uncanceled_sessions_for_day(&self, day: DayIndex) -> Vec<Session> {
        self.dataset
            .sessions
            .iter()
            .filter(|s| s.day == day && !s.cancelled)
            .map(|s| {
                let mut session = s.clone();
                session.has_alarm = self.alarms.contains(&s.id);
                session.highlight = self.highlights.contains(&s.id);
                session
            })
            .collect()
    }

    fn read_alarm_session_ids(&self) -> HashSet<String> {
        self.alarms.clone()
    }

    fn read_highlight_session_ids(&self) -> HashSet<String> {
        self.highlights.clone()
    }

    fn read_display_day_index(&self) -> DayIndex {
        self.display_day.unwrap_or(DayIndex::FIRST)
    }

    fn update_display_day_index(&mut self, day: DayIndex) {
        self.display_day = Some(day);
    }

    fn read_context(&self) -> Result<ScheduleContext, ScheduleError> {
        ScheduleContext::new(
            self.dataset.rooms.clone(),
            self.dataset.days.clone(),
            self.dataset.version.clone(),
            self.dataset.utc_offset_minutes,
        )
    }

    fn read_shifts_hash(&self) -> i64 {
        self.shifts_hash
    }

    fn read_last_shifts_hash(&self) -> i64 {
        self.last_shifts_hash
    }

    fn update_last_shifts_hash(&mut self, hash: i64) {
        self.last_shifts_hash = hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dataset() -> Dataset {
        let start = Utc.with_ymd_and_hms(2024, 12, 27, 10, 0, 0).unwrap();
        let mut cancelled = Session::new("gone", "Saal 1", DayIndex::FIRST, start, 30);
        cancelled.cancelled = true;
        let mut starred = Session::new("star", "Saal 1", DayIndex::FIRST, start, 30);
        starred.highlight = true;
        Dataset {
            version: "1.0".to_string(),
            utc_offset_minutes: 60,
            rooms: vec!["Saal 1".to_string()],
            days: vec![
                NaiveDate::from_ymd_opt(2024, 12, 27).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 28).unwrap(),
            ],
            sessions: vec![
                cancelled,
                starred,
                Session::new("next", "Saal 1", DayIndex::new(2), start, 30),
            ],
        }
    }

    #[test]
    fn loads_only_uncancelled_sessions_of_the_day() {
        let repository = InMemoryRepository::new(dataset());
        let ids: Vec<String> = repository
            .load_uncanceled_sessions_for_day(DayIndex::FIRST)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["star"]);
    }

    #[test]
    fn seeds_flags_from_the_dataset() {
        let mut repository = InMemoryRepository::new(dataset());
        assert!(repository.read_highlight_session_ids().contains("star"));
        repository.set_alarm("star", true);
        let sessions = repository.load_uncanceled_sessions_for_day(DayIndex::FIRST);
        assert!(sessions[0].has_alarm);
        repository.set_alarm("star", false);
        assert!(repository.read_alarm_session_ids().is_empty());
    }

    #[test]
    fn display_day_defaults_to_the_first() {
        let mut repository = InMemoryRepository::new(dataset());
        assert_eq!(repository.read_display_day_index(), DayIndex::FIRST);
        repository.update_display_day_index(DayIndex::new(2));
        assert_eq!(repository.read_display_day_index(), DayIndex::new(2));
    }

    #[test]
    fn builds_context_from_the_dataset() {
        let context = InMemoryRepository::new(dataset()).read_context().unwrap();
        assert_eq!(context.day_count(), 2);
        assert_eq!(context.version(), "1.0");
        assert_eq!(context.zone().local_minus_utc(), 3600);
    }

    #[test]
    fn reads_a_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        fs::write(&path, serde_json::to_string(&dataset()).unwrap()).unwrap();
        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.sessions.len(), 3);
        assert!(Dataset::load(&dir.path().join("missing.json")).is_err());
    }
}
