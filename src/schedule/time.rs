//! Minute-of-day arithmetic and the time frame of a conference day

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};

use super::types::Session;
use crate::config::ClockFormat;

/// Minutes in one day. Cursors past this value belong to the next calendar day.
pub const ONE_DAY: u32 = 24 * 60;

/// Positional granularity of the whole grid.
pub const FIVE_MINUTES: u32 = 5;

/// Stride of the time axis.
pub const FIFTEEN_MINUTES: u32 = 15;

/// Layout units per time axis tick, per unit of height.
pub const UNITS_PER_TICK: u32 = FIFTEEN_MINUTES / FIVE_MINUTES;

/// Minute of the day (0..1440) of `instant` as seen in `zone`.
pub fn minute_of_day(instant: DateTime<Utc>, zone: FixedOffset) -> u32 {
    let local = instant.with_timezone(&zone);
    local.hour() * 60 + local.minute()
}

/// Folds a cursor that ran past midnight back into 0..1440.
pub fn normalize_minute(minute: u32) -> u32 {
    minute % ONE_DAY
}

/// Format a minute of the day according to clock format
pub fn format_minute_of_day(minute: u32, clock_format: ClockFormat) -> String {
    let minute = normalize_minute(minute);
    let (hour, min) = (minute / 60, minute % 60);
    match clock_format {
        ClockFormat::Hour24 => format!("{:02}:{:02}", hour, min),
        ClockFormat::Hour12 => {
            let (h12, ampm) = if hour == 0 {
                (12, "am")
            } else if hour < 12 {
                (hour, "am")
            } else if hour == 12 {
                (12, "pm")
            } else {
                (hour - 12, "pm")
            };
            format!("{}:{:02}{}", h12, min, ampm)
        }
    }
}

/// First start and last end of a day's sessions as minute-of-day values.
///
/// `last_end` is not normalized: a program running past midnight ends at a
/// value above [`ONE_DAY`]. `origin` is the calendar date (in the conference
/// zone) on which `first_start` falls; it is `None` for a day without
/// sessions, which renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeFrame {
    first_start: u32,
    last_end: u32,
    origin: Option<NaiveDate>,
}

impl TimeFrame {
    /// The degenerate frame of a day without sessions.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn calculate<'a, I>(sessions: I, zone: FixedOffset) -> Self
    where
        I: IntoIterator<Item = &'a Session>,
    {
        let mut first: Option<DateTime<Utc>> = None;
        let mut last: Option<DateTime<Utc>> = None;
        for session in sessions {
            let Some(end) = session.checked_end() else {
                continue;
            };
            if first.map_or(true, |f| session.start < f) {
                first = Some(session.start);
            }
            if last.map_or(true, |l| end > l) {
                last = Some(end);
            }
        }

        let (Some(first), Some(last)) = (first, last) else {
            return Self::empty();
        };

        let origin = first.with_timezone(&zone).date_naive();
        let first_start = minute_of_day(first, zone);
        let mut last_end = minute_of_day(last, zone);
        // One day at most, even for data spanning several calendar days
        if last.with_timezone(&zone).date_naive() != origin {
            last_end += ONE_DAY;
        }

        Self {
            first_start,
            last_end,
            origin: Some(origin),
        }
    }

    pub fn first_start(&self) -> u32 {
        self.first_start
    }

    pub fn last_end(&self) -> u32 {
        self.last_end
    }

    pub fn origin(&self) -> Option<NaiveDate> {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_none()
    }

    /// Length of the frame in minutes.
    pub fn span(&self) -> u32 {
        self.last_end - self.first_start
    }

    /// Minute of `instant` on the frame's unnormalized scale: anything that
    /// reads earlier than `first_start` belongs to the next day.
    pub fn minute_in_frame(&self, instant: DateTime<Utc>, zone: FixedOffset) -> u32 {
        let minute = minute_of_day(instant, zone);
        if minute < self.first_start {
            minute + ONE_DAY
        } else {
            minute
        }
    }

    /// Local wall clock time of an unnormalized frame cursor.
    pub fn local_time_at(&self, cursor: u32) -> Option<NaiveDateTime> {
        let midnight = self.origin?.and_hms_opt(0, 0, 0)?;
        Some(midnight + Duration::minutes(i64::from(cursor)))
    }
}
