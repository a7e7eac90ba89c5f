use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;

use crate::config::Config;
use crate::error::{ParseFailure, ScheduleError};
use crate::repository::ScheduleRepository;
use crate::schedule::{
    plan_refresh, DayIndex, FlagChange, ParseOutcome, RefreshPlan, ReloadSignals,
    ScheduleContext, ScheduleSnapshot, ScrollTarget, Tick, TimeAxis,
};

/// A request to open the grid on a specific session (e.g. from an alarm).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub session_id: String,
    pub day: DayIndex,
}

/// What the presenting layer has to do after a day was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayUpdate {
    /// All columns were rebuilt; re-create every view.
    Rebuilt,
    /// Geometry is unchanged; redraw the given columns in place.
    Redraw { columns: RangeInclusive<usize> },
}

/// Result of handling a finished fetch/parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseReaction {
    Shown(DayUpdate),
    /// The dataset still has no days; nothing to show.
    Empty,
    /// `argument` is formatted into the message when the key takes one.
    Failed {
        message_key: &'static str,
        argument: Option<String>,
    },
}

/// Drives the day grid: which day is shown, when it is rebuilt and where it
/// scrolls to.
pub struct ScheduleScreen<R: ScheduleRepository> {
    repository: R,
    config: Config,
    context: Option<ScheduleContext>,
    day: DayIndex,
    snapshot: Option<ScheduleSnapshot>,
    pending_deep_link: Option<DeepLink>,
    visible_columns: RangeInclusive<usize>,
}

impl<R: ScheduleRepository> ScheduleScreen<R> {
    pub fn new(repository: R, config: Config) -> Self {
        let context = load_context(&repository);
        let day = repository.read_display_day_index();
        Self {
            repository,
            config,
            context,
            day,
            snapshot: None,
            pending_deep_link: None,
            visible_columns: 0..=0,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn day(&self) -> DayIndex {
        self.day
    }

    pub fn snapshot(&self) -> Option<&ScheduleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn day_count(&self) -> usize {
        self.context.as_ref().map_or(0, ScheduleContext::day_count)
    }

    /// Columns currently on screen, reported by the presenting layer.
    pub fn set_visible_columns(&mut self, first: usize, last: usize) {
        self.visible_columns = first..=last.max(first);
    }

    /// Queues a jump to a session for the next activation.
    pub fn open_deep_link(&mut self, link: DeepLink) {
        self.pending_deep_link = Some(link);
    }

    /// Shows the persisted (or deep-linked) day and returns where to scroll.
    ///
    /// A deep link forces a rebuild and is consumed by this call.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<Option<ScrollTarget>, ScheduleError> {
        let deep_link = self.pending_deep_link.take();
        self.day = self.repository.read_display_day_index();
        if let Some(link) = &deep_link {
            tracing::debug!(session_id = %link.session_id, day = %link.day, "Opening deep link");
            self.day = link.day;
            self.repository.update_display_day_index(link.day);
        }

        if self.day_count() == 0 {
            return Ok(None);
        }
        self.show_day(deep_link.is_some())?;

        match deep_link {
            Some(link) => Ok(self.locate_session(&link.session_id)),
            None => Ok(Some(self.locate_now(now))),
        }
    }

    /// Shows the current day, rebuilding only when required.
    pub fn show_day(&mut self, force_reload: bool) -> Result<DayUpdate, ScheduleError> {
        match plan_refresh(self.day, force_reload, self.snapshot.as_ref()) {
            RefreshPlan::Redraw => Ok(DayUpdate::Redraw {
                columns: self.visible_columns.clone(),
            }),
            RefreshPlan::Rebuild => {
                let context = self.context.as_ref().ok_or(ScheduleError::DayOutOfRange {
                    day: self.day,
                    day_count: 0,
                })?;
                tracing::debug!(day = %self.day, "Loading sessions");
                let sessions = self.repository.load_uncanceled_sessions_for_day(self.day);
                let snapshot =
                    ScheduleSnapshot::build(context, self.day, sessions, self.config.unit_height())?;
                self.snapshot = Some(snapshot);
                Ok(DayUpdate::Rebuilt)
            }
        }
    }

    /// Switches to `day`; selecting the shown day again does nothing.
    pub fn choose_day(&mut self, day: DayIndex) -> Result<Option<DayUpdate>, ScheduleError> {
        if day == self.day && self.snapshot.is_some() {
            return Ok(None);
        }
        if let Some(context) = &self.context {
            context.date_of(day)?;
        }
        self.day = day;
        self.repository.update_display_day_index(day);
        self.show_day(true).map(Some)
    }

    /// Reacts to a finished fetch/parse of schedule or shifts data.
    pub fn on_parse_done(
        &mut self,
        result: Result<ParseOutcome, ParseFailure>,
    ) -> Result<ParseReaction, ScheduleError> {
        let last_shifts_hash = self.repository.read_last_shifts_hash();
        let current_shifts_hash = self.repository.read_shifts_hash();
        tracing::debug!(last_shifts_hash, current_shifts_hash, "Shifts hashes");

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(failure) => {
                tracing::warn!("{}", failure);
                if last_shifts_hash != current_shifts_hash {
                    self.repository.update_last_shifts_hash(current_shifts_hash);
                }
                return Ok(ParseReaction::Failed {
                    message_key: failure.message_key(),
                    argument: failure.message_argument().map(str::to_string),
                });
            }
        };

        let known_version = self
            .context
            .as_ref()
            .map(|c| c.version().to_string())
            .unwrap_or_default();
        let signals = ReloadSignals::evaluate(
            &outcome,
            &known_version,
            self.day_count(),
            last_shifts_hash,
            current_shifts_hash,
        );
        if let Some(hash) = signals.store_shifts_hash {
            self.repository.update_last_shifts_hash(hash);
        }

        if signals.force_reload {
            self.context = load_context(&self.repository);
            if self.day_count() == 0 {
                self.snapshot = None;
                return Ok(ParseReaction::Empty);
            }
            self.day = self.repository.read_display_day_index();
            if self.day.position().map_or(true, |pos| pos >= self.day_count()) {
                tracing::warn!(
                    day = %self.day,
                    day_count = self.day_count(),
                    "Display day out of range, showing day 1"
                );
                self.day = DayIndex::FIRST;
            }
        }
        self.show_day(signals.force_reload).map(ParseReaction::Shown)
    }

    /// Re-reads alarms and patches the shown sessions without relayout.
    pub fn reload_alarms(&mut self) -> Vec<FlagChange> {
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Vec::new();
        };
        let alarm_ids = self.repository.read_alarm_session_ids();
        snapshot.apply_alarms(&alarm_ids)
    }

    /// Re-reads highlights and patches the shown sessions without relayout.
    pub fn reload_highlights(&mut self) -> Vec<FlagChange> {
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Vec::new();
        };
        let highlight_ids = self.repository.read_highlight_session_ids();
        snapshot.apply_highlights(&highlight_ids)
    }

    pub fn time_axis(&self) -> Option<TimeAxis> {
        self.snapshot.as_ref().map(|snapshot| {
            snapshot
                .time_axis()
                .with_match_window(self.config.now_window_minutes)
                .with_clock_format(self.config.clock_format)
        })
    }

    /// Ticks of the time column; the "now" marker only shows on today.
    pub fn ticks(&self, now: DateTime<Utc>) -> Vec<Tick> {
        let Some(axis) = self.time_axis() else {
            return Vec::new();
        };
        let is_today = self
            .context
            .as_ref()
            .is_some_and(|context| context.is_today(self.day, now));
        axis.ticks(is_today.then_some(now)).collect()
    }

    pub fn locate_now(&self, now: DateTime<Utc>) -> ScrollTarget {
        let visible_column = self
            .config
            .correct_to_visible_column
            .then(|| *self.visible_columns.start());
        match &self.snapshot {
            Some(snapshot) => self
                .config
                .locator()
                .locate_now(snapshot, now, visible_column),
            None => ScrollTarget::TOP,
        }
    }

    pub fn locate_session(&self, session_id: &str) -> Option<ScrollTarget> {
        let snapshot = self.snapshot.as_ref()?;
        match self.config.locator().locate_session(snapshot, session_id) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::debug!("Deep link not shown: {}", e);
                None
            }
        }
    }
}

fn load_context<R: ScheduleRepository>(repository: &R) -> Option<ScheduleContext> {
    match repository.read_context() {
        Ok(context) => Some(context),
        Err(e) => {
            tracing::warn!("Unusable schedule metadata: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Dataset, InMemoryRepository};
    use crate::schedule::Session;
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, h, m, 0).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset {
            version: "1.0".to_string(),
            utc_offset_minutes: 0,
            rooms: vec!["Saal 1".to_string(), "Saal 2".to_string()],
            days: vec![
                NaiveDate::from_ymd_opt(2024, 12, 27).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 28).unwrap(),
            ],
            sessions: vec![
                Session::new("A", "Saal 1", DayIndex::FIRST, at(27, 9, 0), 60),
                Session::new("B", "Saal 1", DayIndex::FIRST, at(27, 10, 0), 30),
                Session::new("C", "Saal 2", DayIndex::new(2), at(28, 11, 0), 30),
            ],
        }
    }

    fn screen() -> ScheduleScreen<InMemoryRepository> {
        let config = Config {
            box_height: 10,
            ..Config::default()
        };
        ScheduleScreen::new(InMemoryRepository::new(dataset()), config)
    }

    #[test]
    fn activation_scrolls_to_now_on_today() {
        let mut screen = screen();
        let target = screen.activate(at(27, 10, 7)).unwrap();
        assert_eq!(target.map(|t| t.vertical_offset), Some(120));
    }

    #[test]
    fn deep_link_switches_day_once() {
        let mut screen = screen();
        screen.open_deep_link(DeepLink {
            session_id: "C".to_string(),
            day: DayIndex::new(2),
        });
        let target = screen.activate(at(27, 10, 7)).unwrap();
        assert_eq!(
            target,
            Some(ScrollTarget {
                vertical_offset: 0,
                column_index: 1
            })
        );
        assert_eq!(screen.repository().read_display_day_index(), DayIndex::new(2));

        // Second activation falls back to "now" on the persisted day
        let target = screen.activate(at(27, 10, 7)).unwrap();
        assert_eq!(target, Some(ScrollTarget::TOP));
    }

    #[test]
    fn reselecting_the_same_day_is_ignored() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        assert_eq!(screen.choose_day(DayIndex::FIRST).unwrap(), None);
        assert_eq!(
            screen.choose_day(DayIndex::new(2)).unwrap(),
            Some(DayUpdate::Rebuilt)
        );
        assert_eq!(screen.snapshot().map(|s| s.day()), Some(DayIndex::new(2)));
    }

    #[test]
    fn choosing_an_unknown_day_is_an_error() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        let err = screen.choose_day(DayIndex::new(9)).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::DayOutOfRange {
                day: DayIndex::new(9),
                day_count: 2
            }
        );
        assert_eq!(screen.day(), DayIndex::FIRST);
    }

    #[test]
    fn same_day_without_force_redraws_visible_columns() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        screen.set_visible_columns(0, 1);
        assert_eq!(
            screen.show_day(false).unwrap(),
            DayUpdate::Redraw { columns: 0..=1 }
        );
        assert_eq!(screen.show_day(true).unwrap(), DayUpdate::Rebuilt);
    }

    #[test]
    fn flag_reload_patches_without_rebuild() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        let before = screen.snapshot().cloned();
        screen.repository_mut().set_alarm("B", true);
        let changes = screen.reload_alarms();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].session_id, "B");
        let after = screen.snapshot().unwrap();
        assert_eq!(
            before.unwrap().columns()[0].geometry("B"),
            after.columns()[0].geometry("B")
        );
        assert!(screen.reload_highlights().is_empty());
    }

    #[test]
    fn now_marker_only_on_today() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        let marked = screen.ticks(at(27, 9, 20)).into_iter().filter(|t| t.is_now).count();
        assert_eq!(marked, 1);
        let marked = screen.ticks(at(28, 9, 20)).into_iter().filter(|t| t.is_now).count();
        assert_eq!(marked, 0);
    }

    #[test]
    fn new_version_reloads_and_resets_an_invalid_day() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        screen.repository_mut().update_display_day_index(DayIndex::new(2));

        let mut smaller = dataset();
        smaller.version = "2.0".to_string();
        smaller.days.truncate(1);
        screen.repository_mut().replace_dataset(smaller);

        let reaction = screen
            .on_parse_done(Ok(ParseOutcome::Schedule {
                version: "2.0".to_string(),
            }))
            .unwrap();
        assert_eq!(reaction, ParseReaction::Shown(DayUpdate::Rebuilt));
        assert_eq!(screen.day(), DayIndex::FIRST);
    }

    #[test]
    fn unchanged_parse_keeps_the_grid() {
        let mut screen = screen();
        screen.activate(at(27, 8, 0)).unwrap();
        let reaction = screen
            .on_parse_done(Ok(ParseOutcome::Schedule {
                version: "1.0".to_string(),
            }))
            .unwrap();
        assert!(matches!(reaction, ParseReaction::Shown(DayUpdate::Redraw { .. })));
    }

    #[test]
    fn failed_parse_reports_message_key_and_stores_shift_hash() {
        let mut screen = screen();
        screen.repository_mut().set_shifts_hash(42);
        let reaction = screen
            .on_parse_done(Err(ParseFailure::Shifts(
                crate::error::ShiftsFailureKind::NotFound,
            )))
            .unwrap();
        assert_eq!(
            reaction,
            ParseReaction::Failed {
                message_key: "shifts_error_not_found",
                argument: None,
            }
        );
        assert_eq!(screen.repository().read_last_shifts_hash(), 42);
    }

    #[test]
    fn empty_dataset_shows_nothing() {
        let mut screen = ScheduleScreen::new(InMemoryRepository::default(), Config::default());
        assert_eq!(screen.activate(at(27, 8, 0)).unwrap(), None);
        let reaction = screen.on_parse_done(Ok(ParseOutcome::Shifts)).unwrap();
        assert_eq!(reaction, ParseReaction::Empty);
    }
}
