//! Per-day, per-room layout of the conference program

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

use super::axis::TimeAxis;
use super::layout::RoomLayoutCalculator;
use super::time::TimeFrame;
use super::types::{DayIndex, FlagChange, Geometry, RoomPartition, Session};
use crate::error::ScheduleError;

/// Dataset-wide facts every snapshot is built against: known rooms in
/// display order, one calendar date per day, the schedule version and the
/// conference's UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleContext {
    rooms: Vec<String>,
    days: Vec<NaiveDate>,
    version: String,
    zone: FixedOffset,
}

impl ScheduleContext {
    pub fn new(
        rooms: Vec<String>,
        days: Vec<NaiveDate>,
        version: impl Into<String>,
        utc_offset_minutes: i32,
    ) -> Result<Self, ScheduleError> {
        let zone = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ScheduleError::InvalidUtcOffset {
                minutes: utc_offset_minutes,
            })?;
        Ok(Self {
            rooms,
            days,
            version: version.into(),
            zone,
        })
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Calendar date of `day`, or `DayOutOfRange` when the dataset does not
    /// know that day.
    pub fn date_of(&self, day: DayIndex) -> Result<NaiveDate, ScheduleError> {
        day.position()
            .and_then(|pos| self.days.get(pos).copied())
            .ok_or(ScheduleError::DayOutOfRange {
                day,
                day_count: self.days.len(),
            })
    }

    /// The day whose date is today in the conference zone.
    pub fn index_of_today(&self, now: DateTime<Utc>) -> Option<DayIndex> {
        let today = now.with_timezone(&self.zone).date_naive();
        self.days
            .iter()
            .position(|date| *date == today)
            .map(|pos| DayIndex::new(pos as u32 + 1))
    }

    pub fn is_today(&self, day: DayIndex, now: DateTime<Utc>) -> bool {
        self.index_of_today(now) == Some(day)
    }
}

/// One room column of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomColumn {
    partition: RoomPartition,
    geometries: HashMap<String, Geometry>,
}

impl RoomColumn {
    pub fn name(&self) -> &str {
        &self.partition.name
    }

    pub fn sessions(&self) -> &[Session] {
        &self.partition.sessions
    }

    pub fn partition(&self) -> &RoomPartition {
        &self.partition
    }

    pub fn geometry(&self, session_id: &str) -> Option<Geometry> {
        self.geometries.get(session_id).copied()
    }

    /// Sessions paired with their geometry, in partition order.
    pub fn placed(&self) -> impl Iterator<Item = (&Session, Geometry)> {
        self.partition
            .sessions
            .iter()
            .filter_map(|s| self.geometry(&s.id).map(|g| (s, g)))
    }
}

/// The complete layout of one day.
///
/// Built once per rebuild and replaced, never re-laid out. Only the alarm
/// and highlight flags of its sessions change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSnapshot {
    day: DayIndex,
    date: NaiveDate,
    zone: FixedOffset,
    unit_height: u32,
    frame: TimeFrame,
    columns: Vec<RoomColumn>,
    rejected: Vec<ScheduleError>,
}

impl ScheduleSnapshot {
    pub fn build(
        context: &ScheduleContext,
        day: DayIndex,
        sessions: Vec<Session>,
        unit_height: u32,
    ) -> Result<Self, ScheduleError> {
        let date = context.date_of(day)?;
        if unit_height == 0 {
            return Err(ScheduleError::InvalidUnitHeight);
        }
        let calculator = RoomLayoutCalculator::new(unit_height, context.zone());

        let mut partitions: Vec<RoomPartition> =
            context.rooms().iter().map(RoomPartition::new).collect();
        let room_index: HashMap<&str, usize> = context
            .rooms()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut rejected = Vec::new();
        for session in sessions {
            if session.duration_minutes <= 0 {
                rejected.push(ScheduleError::InvalidDuration {
                    session_id: session.id,
                    duration: session.duration_minutes,
                });
                continue;
            }
            if session.checked_end().is_none()
                || calculator.height_of(session.duration_minutes).is_none()
            {
                rejected.push(ScheduleError::DurationOutOfRange {
                    session_id: session.id,
                    duration: session.duration_minutes,
                });
                continue;
            }
            match room_index.get(session.room.as_str()) {
                Some(&index) => partitions[index].sessions.push(session),
                None => rejected.push(ScheduleError::UnknownRoom {
                    session_id: session.id,
                    room: session.room,
                }),
            }
        }
        for error in &rejected {
            tracing::warn!(day = %day, "Excluding session from layout: {}", error);
        }

        let frame = TimeFrame::calculate(
            partitions.iter().flat_map(|p| p.sessions.iter()),
            context.zone(),
        );
        tracing::debug!(
            day = %day,
            first_start = frame.first_start(),
            last_end = frame.last_end(),
            "Calculated time frame"
        );

        let columns = partitions
            .into_iter()
            .map(|partition| {
                let geometries = if frame.is_empty() {
                    HashMap::new()
                } else {
                    calculator.layout(&partition, &frame)
                };
                RoomColumn {
                    partition,
                    geometries,
                }
            })
            .collect();

        Ok(Self {
            day,
            date,
            zone: context.zone(),
            unit_height,
            frame,
            columns,
            rejected,
        })
    }

    pub fn day(&self) -> DayIndex {
        self.day
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn unit_height(&self) -> u32 {
        self.unit_height
    }

    pub fn frame(&self) -> &TimeFrame {
        &self.frame
    }

    pub fn columns(&self) -> &[RoomColumn] {
        &self.columns
    }

    pub fn room_names(&self) -> Vec<&str> {
        self.columns.iter().map(RoomColumn::name).collect()
    }

    /// Sessions excluded from the layout, with the reason.
    pub fn rejected(&self) -> &[ScheduleError] {
        &self.rejected
    }

    /// True when the day has nothing to render.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Total height of the grid in layout units.
    pub fn content_height(&self) -> u32 {
        self.frame
            .span()
            .div_ceil(super::time::FIVE_MINUTES)
            .saturating_mul(self.unit_height)
    }

    pub fn all_sessions(&self) -> impl Iterator<Item = &Session> {
        self.columns.iter().flat_map(|c| c.sessions().iter())
    }

    /// Column index, session and geometry of `session_id`.
    pub fn find_session(&self, session_id: &str) -> Option<(usize, &Session, Geometry)> {
        self.columns.iter().enumerate().find_map(|(index, column)| {
            column
                .sessions()
                .iter()
                .find(|s| s.id == session_id)
                .and_then(|s| column.geometry(&s.id).map(|g| (index, s, g)))
        })
    }

    pub fn find_room_index(&self, session_id: &str) -> Option<usize> {
        self.find_session(session_id).map(|(index, _, _)| index)
    }

    pub fn time_axis(&self) -> TimeAxis {
        TimeAxis::new(self.frame, self.zone)
    }

    /// Sets the alarm flag of every session from `alarm_ids`. Geometry is
    /// left untouched; the returned changes name the views to redraw.
    pub fn apply_alarms(&mut self, alarm_ids: &HashSet<String>) -> Vec<FlagChange> {
        self.patch_flags(|session| {
            let has_alarm = alarm_ids.contains(&session.id);
            let changed = session.has_alarm != has_alarm;
            session.has_alarm = has_alarm;
            changed
        })
    }

    /// Sets the highlight flag of every session from `highlight_ids`.
    pub fn apply_highlights(&mut self, highlight_ids: &HashSet<String>) -> Vec<FlagChange> {
        self.patch_flags(|session| {
            let highlight = highlight_ids.contains(&session.id);
            let changed = session.highlight != highlight;
            session.highlight = highlight;
            changed
        })
    }

    fn patch_flags<F>(&mut self, mut update: F) -> Vec<FlagChange>
    where
        F: FnMut(&mut Session) -> bool,
    {
        let mut changes = Vec::new();
        for (column_index, column) in self.columns.iter_mut().enumerate() {
            for session in column.partition.sessions.iter_mut() {
                if update(session) {
                    changes.push(FlagChange {
                        session_id: session.id.clone(),
                        column_index,
                        has_alarm: session.has_alarm,
                        highlight: session.highlight,
                    });
                }
            }
        }
        changes
    }
}
