//! Error types for the schedule grid.

use thiserror::Error;

use crate::schedule::DayIndex;

/// Errors raised while turning a day's sessions into a grid.
///
/// Per-session variants (`InvalidDuration`, `DurationOutOfRange`,
/// `UnknownRoom`) never abort a build: the offending session is left out of
/// the layout and the error is kept on the snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Session '{session_id}' has a non-positive duration ({duration} min)")]
    InvalidDuration { session_id: String, duration: i64 },

    #[error("Session '{session_id}' is assigned to unknown room '{room}'")]
    UnknownRoom { session_id: String, room: String },

    #[error("Session '{session_id}' lasts too long to be laid out ({duration} min)")]
    DurationOutOfRange { session_id: String, duration: i64 },

    #[error("Unit height must be at least 1")]
    InvalidUnitHeight,

    #[error("Day {day} is out of range (known days: {day_count})")]
    DayOutOfRange { day: DayIndex, day_count: usize },

    #[error("Session '{session_id}' is not part of the displayed day")]
    SessionNotFound { session_id: String },

    #[error("UTC offset of {minutes} minutes is not representable")]
    InvalidUtcOffset { minutes: i32 },
}

/// What went wrong while fetching or parsing the main schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleFailureKind {
    /// Parsed, but the schedule carried no version.
    VersionMissing,
    /// Parsing failed for the schedule with this version.
    ParseFailed { version: String },
}

/// What went wrong while fetching the volunteer shifts feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftsFailureKind {
    Forbidden,
    NotFound,
    HttpStatus(u16),
    Exception,
}

/// A failed parse reported by the fetch layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("Schedule parsing failed: {0:?}")]
    Schedule(ScheduleFailureKind),
    #[error("Shifts parsing failed: {0:?}")]
    Shifts(ShiftsFailureKind),
}

impl ParseFailure {
    /// Message key the presenting layer turns into user facing text.
    pub fn message_key(&self) -> &'static str {
        match self {
            ParseFailure::Schedule(ScheduleFailureKind::VersionMissing) => {
                "schedule_parsing_error_generic"
            }
            ParseFailure::Schedule(ScheduleFailureKind::ParseFailed { .. }) => {
                "schedule_parsing_error_with_version"
            }
            ParseFailure::Shifts(ShiftsFailureKind::Forbidden) => "shifts_error_forbidden",
            ParseFailure::Shifts(ShiftsFailureKind::NotFound) => "shifts_error_not_found",
            ParseFailure::Shifts(ShiftsFailureKind::HttpStatus(_)) => "shifts_error_http_status",
            ParseFailure::Shifts(ShiftsFailureKind::Exception) => "shifts_error_exception",
        }
    }

    /// Argument to format into the message, if the key takes one.
    pub fn message_argument(&self) -> Option<&str> {
        match self {
            ParseFailure::Schedule(ScheduleFailureKind::ParseFailed { version }) => {
                Some(version.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keys_distinguish_shift_failures() {
        assert_eq!(
            ParseFailure::Shifts(ShiftsFailureKind::Forbidden).message_key(),
            "shifts_error_forbidden"
        );
        assert_eq!(
            ParseFailure::Shifts(ShiftsFailureKind::HttpStatus(502)).message_key(),
            "shifts_error_http_status"
        );
        assert_eq!(
            ParseFailure::Schedule(ScheduleFailureKind::VersionMissing).message_key(),
            "schedule_parsing_error_generic"
        );
    }

    #[test]
    fn schedule_parse_failure_carries_its_version() {
        let failure = ParseFailure::Schedule(ScheduleFailureKind::ParseFailed {
            version: "2024-12-20 18:00".to_string(),
        });
        assert_eq!(failure.message_key(), "schedule_parsing_error_with_version");
        assert_eq!(failure.message_argument(), Some("2024-12-20 18:00"));
        assert_eq!(
            ParseFailure::Shifts(ShiftsFailureKind::NotFound).message_argument(),
            None
        );
    }

    #[test]
    fn out_of_range_day_message() {
        let err = ScheduleError::DayOutOfRange {
            day: DayIndex::new(5),
            day_count: 4,
        };
        assert_eq!(err.to_string(), "Day 5 is out of range (known days: 4)");
    }
}
