use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based ordinal of a conference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayIndex(u32);

impl DayIndex {
    pub const FIRST: DayIndex = DayIndex(1);

    pub fn new(day: u32) -> Self {
        Self(day)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position, `None` for the invalid day 0.
    pub fn position(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single talk, workshop or break as delivered by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub room: String,
    pub day: DayIndex,
    pub start: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub has_alarm: bool,
    #[serde(default)]
    pub highlight: bool,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        room: impl Into<String>,
        day: DayIndex,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            room: room.into(),
            day,
            start,
            duration_minutes,
            cancelled: false,
            has_alarm: false,
            highlight: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// End of the session, `None` when the duration does not fit a
    /// timestamp.
    pub fn checked_end(&self) -> Option<DateTime<Utc>> {
        Duration::try_minutes(self.duration_minutes)
            .and_then(|duration| self.start.checked_add_signed(duration))
    }
}

/// Vertical placement of a session inside its room column, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub offset: u32,
    pub height: u32,
}

impl Geometry {
    pub fn bottom(&self) -> u32 {
        self.offset.saturating_add(self.height)
    }
}

/// The sessions of one room for one day, in the order the transformer
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPartition {
    pub name: String,
    pub sessions: Vec<Session>,
}

impl RoomPartition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sessions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Where the grid should scroll to on first display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollTarget {
    pub vertical_offset: u32,
    pub column_index: usize,
}

impl ScrollTarget {
    pub const TOP: ScrollTarget = ScrollTarget {
        vertical_offset: 0,
        column_index: 0,
    };
}

/// Tells the presenting layer which session views need a redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagChange {
    pub session_id: String,
    pub column_index: usize,
    pub has_alarm: bool,
    pub highlight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn end_is_start_plus_duration() {
        let start = Utc.with_ymd_and_hms(2024, 12, 27, 23, 30, 0).unwrap();
        let session = Session::new("a", "Saal 1", DayIndex::FIRST, start, 90);
        assert_eq!(
            session.checked_end(),
            Some(Utc.with_ymd_and_hms(2024, 12, 28, 1, 0, 0).unwrap())
        );
    }

    #[test]
    fn huge_durations_have_no_end() {
        let start = Utc.with_ymd_and_hms(2024, 12, 27, 9, 0, 0).unwrap();
        let session = Session::new("a", "Saal 1", DayIndex::FIRST, start, i64::MAX);
        assert_eq!(session.checked_end(), None);
    }

    #[test]
    fn day_zero_has_no_position() {
        assert_eq!(DayIndex::new(0).position(), None);
        assert_eq!(DayIndex::new(3).position(), Some(2));
    }

    #[test]
    fn deserializes_repository_json() {
        let json = r#"{
            "id": "talk-1",
            "room": "Saal 1",
            "day": 2,
            "start": "2024-12-28T10:00:00Z",
            "duration": 40
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.day, DayIndex::new(2));
        assert_eq!(session.duration_minutes, 40);
        assert!(!session.has_alarm);
        assert!(!session.cancelled);
    }
}
