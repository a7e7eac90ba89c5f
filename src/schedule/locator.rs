//! Finds the initial scroll position of a day grid

use chrono::{DateTime, Utc};

use super::snapshot::ScheduleSnapshot;
use super::time::{FIFTEEN_MINUTES, FIVE_MINUTES, UNITS_PER_TICK};
use super::types::ScrollTarget;
use crate::error::ScheduleError;

/// What the grid should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateTarget<'a> {
    /// The current time, if the displayed day is today.
    Now,
    /// A deep-linked session.
    Session(&'a str),
}

/// Turns "now" or a session into a [`ScrollTarget`].
#[derive(Debug, Clone, Copy)]
pub struct TemporalLocator {
    match_window_minutes: u32,
    correct_to_visible_column: bool,
}

impl Default for TemporalLocator {
    fn default() -> Self {
        Self {
            match_window_minutes: FIFTEEN_MINUTES,
            correct_to_visible_column: true,
        }
    }
}

impl TemporalLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_window(mut self, minutes: u32) -> Self {
        self.match_window_minutes = minutes;
        self
    }

    /// Disables the fine correction against the visible column.
    pub fn with_column_correction(mut self, enabled: bool) -> Self {
        self.correct_to_visible_column = enabled;
        self
    }

    pub fn locate(
        &self,
        target: LocateTarget<'_>,
        snapshot: &ScheduleSnapshot,
        now: DateTime<Utc>,
        visible_column: Option<usize>,
    ) -> Result<ScrollTarget, ScheduleError> {
        let scroll_target = match target {
            LocateTarget::Session(session_id) => self.locate_session(snapshot, session_id)?,
            LocateTarget::Now => self.locate_now(snapshot, now, visible_column),
        };
        tracing::debug!(
            day = %snapshot.day(),
            vertical_offset = scroll_target.vertical_offset,
            column_index = scroll_target.column_index,
            "Located scroll target"
        );
        Ok(scroll_target)
    }

    /// Locks onto the start of the session, in the session's own room column.
    pub fn locate_session(
        &self,
        snapshot: &ScheduleSnapshot,
        session_id: &str,
    ) -> Result<ScrollTarget, ScheduleError> {
        let (column_index, _, geometry) =
            snapshot
                .find_session(session_id)
                .ok_or_else(|| ScheduleError::SessionNotFound {
                    session_id: session_id.to_string(),
                })?;
        Ok(ScrollTarget {
            vertical_offset: geometry.offset,
            column_index,
        })
    }

    /// Scans the quarter-hour ticks for the one containing `now`, then snaps
    /// back to the start of the session running at that tick in the visible
    /// column.
    ///
    /// Only the visible column is consulted for the snap, so when another
    /// room holds the session running "now" the offset stays on the tick.
    /// A miss (stale data, clock skew) ends at the bottom of the frame.
    pub fn locate_now(
        &self,
        snapshot: &ScheduleSnapshot,
        now: DateTime<Utc>,
        visible_column: Option<usize>,
    ) -> ScrollTarget {
        let column_index = visible_column.unwrap_or(0);
        let top = ScrollTarget {
            vertical_offset: 0,
            column_index,
        };

        let zone = snapshot.zone();
        let now_local = now.with_timezone(&zone).naive_local();
        if snapshot.is_empty() || now_local.date() != snapshot.date() {
            return top;
        }

        let frame = snapshot.frame();
        match frame.local_time_at(frame.first_start()) {
            Some(first_start) if now_local >= first_start => {}
            _ => return top,
        }

        let unit_height = snapshot.unit_height();
        let axis = snapshot.time_axis().with_match_window(self.match_window_minutes);
        let mut time = frame.first_start();
        let tick_height = UNITS_PER_TICK.saturating_mul(unit_height);
        let mut scroll_amount = 0u32;
        while time < frame.last_end() {
            if axis.is_matched(time, now) {
                break;
            }
            scroll_amount = scroll_amount.saturating_add(tick_height);
            time += FIFTEEN_MINUTES;
        }

        if self.correct_to_visible_column {
            if let Some(column) = visible_column.and_then(|i| snapshot.columns().get(i)) {
                for session in column.sessions() {
                    let start = frame.minute_in_frame(session.start, zone);
                    let Ok(duration) = u32::try_from(session.duration_minutes) else {
                        continue;
                    };
                    if start <= time && start.saturating_add(duration) > time {
                        tracing::debug!(
                            session_id = %session.id,
                            time,
                            start,
                            "Snapping to running session"
                        );
                        scroll_amount = scroll_amount
                            .saturating_sub(((time - start) / FIVE_MINUTES).saturating_mul(unit_height));
                        time = start;
                    }
                }
            }
        }

        ScrollTarget {
            vertical_offset: scroll_amount,
            column_index,
        }
    }
}
