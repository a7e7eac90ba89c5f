//! The 15-minute time column on the left of the grid

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};

use super::time::{format_minute_of_day, normalize_minute, TimeFrame, FIFTEEN_MINUTES};
use crate::config::ClockFormat;

/// One row of the time column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// Unnormalized frame cursor; exceeds a day for programs past midnight.
    pub cursor: u32,
    /// Printed minute of the day, 0..1440.
    pub minute_of_day: u32,
    pub label: String,
    pub is_now: bool,
}

/// Builds the tick sequence for a time frame.
///
/// The axis is a pure function of its frame: every call to [`TimeAxis::ticks`]
/// starts a fresh iteration.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    frame: TimeFrame,
    zone: FixedOffset,
    match_window_minutes: u32,
    clock_format: ClockFormat,
}

impl TimeAxis {
    pub fn new(frame: TimeFrame, zone: FixedOffset) -> Self {
        Self {
            frame,
            zone,
            match_window_minutes: FIFTEEN_MINUTES,
            clock_format: ClockFormat::default(),
        }
    }

    pub fn with_match_window(mut self, minutes: u32) -> Self {
        self.match_window_minutes = minutes;
        self
    }

    pub fn with_clock_format(mut self, clock_format: ClockFormat) -> Self {
        self.clock_format = clock_format;
        self
    }

    pub fn frame(&self) -> &TimeFrame {
        &self.frame
    }

    pub fn match_window_minutes(&self) -> u32 {
        self.match_window_minutes
    }

    /// Ticks from the first session start up to (excluding) the last session
    /// end, with the "now" marker evaluated against `now`.
    pub fn ticks(&self, now: Option<DateTime<Utc>>) -> Ticks {
        Ticks {
            axis: *self,
            cursor: self.frame.first_start(),
            now: now.map(|now| now.with_timezone(&self.zone).naive_local()),
        }
    }

    /// Whether `now` falls into `[cursor, cursor + window)` on the frame's
    /// calendar, so a tick at 10:00 on the first day never matches 10:05 on
    /// another day.
    pub fn is_matched(&self, cursor: u32, now: DateTime<Utc>) -> bool {
        self.matches_local(cursor, now.with_timezone(&self.zone).naive_local())
    }

    fn matches_local(&self, cursor: u32, now: NaiveDateTime) -> bool {
        let Some(tick_time) = self.frame.local_time_at(cursor) else {
            return false;
        };
        let window_end = tick_time + Duration::minutes(i64::from(self.match_window_minutes));
        tick_time <= now && now < window_end
    }
}

/// Iterator over the ticks of a [`TimeAxis`].
#[derive(Debug, Clone)]
pub struct Ticks {
    axis: TimeAxis,
    cursor: u32,
    now: Option<NaiveDateTime>,
}

impl Iterator for Ticks {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.axis.frame.is_empty() || self.cursor >= self.axis.frame.last_end() {
            return None;
        }
        let cursor = self.cursor;
        self.cursor += FIFTEEN_MINUTES;

        let minute_of_day = normalize_minute(cursor);
        let is_now = self
            .now
            .is_some_and(|now| self.axis.matches_local(cursor, now));
        Some(Tick {
            cursor,
            minute_of_day,
            label: format_minute_of_day(minute_of_day, self.axis.clock_format),
            is_now,
        })
    }
}
