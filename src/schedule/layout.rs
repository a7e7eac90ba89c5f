use chrono::FixedOffset;
use std::collections::HashMap;

use super::time::{TimeFrame, FIVE_MINUTES};
use super::types::{Geometry, RoomPartition};

/// Turns a room's sessions into vertical geometries.
///
/// All positions are counted in 5-minute steps multiplied by `unit_height`.
/// Overlapping sessions keep overlapping geometries; sessions with a
/// non-positive duration are skipped (they are rejected before layout).
#[derive(Debug, Clone, Copy)]
pub struct RoomLayoutCalculator {
    unit_height: u32,
    zone: FixedOffset,
}

impl RoomLayoutCalculator {
    pub fn new(unit_height: u32, zone: FixedOffset) -> Self {
        Self { unit_height, zone }
    }

    pub fn unit_height(&self) -> u32 {
        self.unit_height
    }

    /// Height of a session lasting `duration_minutes`, `None` when the
    /// duration is not positive or the height does not fit in `u32`.
    pub fn height_of(&self, duration_minutes: i64) -> Option<u32> {
        let duration = u32::try_from(duration_minutes).ok().filter(|d| *d > 0)?;
        (duration / FIVE_MINUTES).checked_mul(self.unit_height)
    }

    /// Geometry per session id of `room`.
    pub fn layout(&self, room: &RoomPartition, frame: &TimeFrame) -> HashMap<String, Geometry> {
        let mut geometries = HashMap::with_capacity(room.sessions.len());
        if frame.is_empty() {
            return geometries;
        }

        for session in &room.sessions {
            let Some(height) = self.height_of(session.duration_minutes) else {
                continue;
            };
            let start = frame.minute_in_frame(session.start, self.zone);
            let elapsed = start - frame.first_start();
            let Some(offset) = (elapsed / FIVE_MINUTES).checked_mul(self.unit_height) else {
                continue;
            };
            geometries.insert(session.id.clone(), Geometry { offset, height });
        }
        geometries
    }
}
