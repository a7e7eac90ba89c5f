//! Decides between rebuilding a day grid and patching it in place

use super::snapshot::ScheduleSnapshot;
use super::types::DayIndex;

/// What to do with the current grid when a day is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPlan {
    /// Lay the day out from scratch.
    Rebuild,
    /// Keep the geometry and redraw the existing views.
    Redraw,
}

/// Rebuild unless the same day is already laid out and no reload is forced.
pub fn should_rebuild(
    requested_day: DayIndex,
    force_reload: bool,
    current: Option<&ScheduleSnapshot>,
) -> bool {
    force_reload || current.map_or(true, |snapshot| snapshot.day() != requested_day)
}

pub fn plan_refresh(
    requested_day: DayIndex,
    force_reload: bool,
    current: Option<&ScheduleSnapshot>,
) -> RefreshPlan {
    let rebuild = should_rebuild(requested_day, force_reload, current);
    tracing::debug!(
        day = %requested_day,
        force_reload,
        cached_day = ?current.map(ScheduleSnapshot::day),
        rebuild,
        "Planned refresh"
    );
    if rebuild {
        RefreshPlan::Rebuild
    } else {
        RefreshPlan::Redraw
    }
}

/// A successful fetch and parse reported by the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Schedule { version: String },
    Shifts,
}

/// Consequences of a finished parse for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignals {
    /// Re-read metadata and force a rebuild of the displayed day.
    pub force_reload: bool,
    /// Shifts hash to persist as the new "last seen" value.
    pub store_shifts_hash: Option<i64>,
}

impl ReloadSignals {
    pub fn evaluate(
        outcome: &ParseOutcome,
        known_version: &str,
        day_count: usize,
        last_shifts_hash: i64,
        current_shifts_hash: i64,
    ) -> Self {
        let shifts_changed = last_shifts_hash != current_shifts_hash;
        let version_changed = match outcome {
            ParseOutcome::Schedule { version } => version != known_version,
            ParseOutcome::Shifts => false,
        };
        Self {
            force_reload: day_count == 0 || version_changed || shifts_changed,
            store_shifts_hash: shifts_changed.then_some(current_shifts_hash),
        }
    }
}
