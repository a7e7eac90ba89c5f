use std::fmt::Write;

use crate::schedule::{Geometry, ScheduleSnapshot, Session, Tick, UNITS_PER_TICK};

const TIME_COLUMN_WIDTH: usize = 8;
const ROOM_COLUMN_WIDTH: usize = 18;

/// Render a snapshot as a plain text grid: one line per 5 minutes, a time
/// column on the left and one column per room.
///
/// Session cells start with their flags (`!` alarm, `*` highlight) followed
/// by the title, or the id when the title is empty. The tick holding "now"
/// is marked with `>`.
pub fn render_text_grid(snapshot: &ScheduleSnapshot, ticks: &[Tick]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:width$}", "", width = TIME_COLUMN_WIDTH);
    for name in snapshot.room_names() {
        let _ = write!(out, "|{}", cell(name));
    }
    out.push('\n');

    if snapshot.is_empty() {
        out.push_str("(no sessions)\n");
        return out;
    }

    let unit_height = snapshot.unit_height();
    let rows = snapshot.content_height() / unit_height;
    for row in 0..rows {
        let label = if row % UNITS_PER_TICK == 0 {
            ticks.get((row / UNITS_PER_TICK) as usize).map(tick_label)
        } else {
            None
        };
        let _ = write!(
            out,
            "{:width$}",
            label.unwrap_or_default(),
            width = TIME_COLUMN_WIDTH
        );

        let offset = row * unit_height;
        for column in snapshot.columns() {
            let text = column
                .placed()
                .find(|(_, geometry)| covers(*geometry, offset, unit_height))
                .map(|(session, geometry)| {
                    if geometry.offset / unit_height == row {
                        session_label(session)
                    } else {
                        ":".to_string()
                    }
                })
                .unwrap_or_default();
            let _ = write!(out, "|{}", cell(&text));
        }
        out.push('\n');
    }
    out
}

fn tick_label(tick: &Tick) -> String {
    if tick.is_now {
        format!(">{}", tick.label)
    } else {
        format!(" {}", tick.label)
    }
}

fn covers(geometry: Geometry, offset: u32, unit_height: u32) -> bool {
    // Zero-height sessions still claim the row they start in
    let bottom = geometry.bottom().max(geometry.offset.saturating_add(unit_height));
    geometry.offset <= offset && offset < bottom
}

fn session_label(session: &Session) -> String {
    let mut label = String::new();
    if session.has_alarm {
        label.push('!');
    }
    if session.highlight {
        label.push('*');
    }
    let name = if session.title.is_empty() {
        &session.id
    } else {
        &session.title
    };
    label.push_str(name);
    label
}

fn cell(text: &str) -> String {
    let truncated: String = text.chars().take(ROOM_COLUMN_WIDTH).collect();
    format!("{:width$}", truncated, width = ROOM_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DayIndex, ScheduleContext, FIVE_MINUTES};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn snapshot() -> ScheduleSnapshot {
        let context = ScheduleContext::new(
            vec!["Saal 1".to_string(), "Saal 2".to_string()],
            vec![NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()],
            "1.0",
            0,
        )
        .unwrap();
        let at = |h, m| Utc.with_ymd_and_hms(2024, 12, 27, h, m, 0).unwrap();
        let mut keynote = Session::new("k1", "Saal 1", DayIndex::FIRST, at(9, 0), 30)
            .with_title("Keynote");
        keynote.highlight = true;
        let talk = Session::new("t1", "Saal 2", DayIndex::FIRST, at(9, 15), 15);
        ScheduleSnapshot::build(&context, DayIndex::FIRST, vec![keynote, talk], 4).unwrap()
    }

    #[test]
    fn renders_one_line_per_five_minutes() {
        let snapshot = snapshot();
        let ticks: Vec<Tick> = snapshot.time_axis().ticks(None).collect();
        let grid = render_text_grid(&snapshot, &ticks);
        let lines: Vec<&str> = grid.lines().collect();

        // Header plus 30 minutes of program
        assert_eq!(lines.len(), 1 + (30 / FIVE_MINUTES) as usize);
        assert!(lines[0].contains("Saal 1"));
        assert!(lines[1].starts_with(" 09:00"));
        assert!(lines[1].contains("*Keynote"));
        assert!(lines[2].contains(':'));
        assert!(lines[4].starts_with(" 09:15"));
        assert!(lines[4].contains("t1"));
    }

    #[test]
    fn marks_the_current_tick() {
        let snapshot = snapshot();
        let now = Utc.with_ymd_and_hms(2024, 12, 27, 9, 20, 0).unwrap();
        let ticks: Vec<Tick> = snapshot.time_axis().ticks(Some(now)).collect();
        let grid = render_text_grid(&snapshot, &ticks);
        assert!(grid.lines().nth(4).unwrap().starts_with(">09:15"));
    }

    #[test]
    fn empty_day_says_so() {
        let context = ScheduleContext::new(
            vec!["Saal 1".to_string()],
            vec![NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()],
            "1.0",
            0,
        )
        .unwrap();
        let snapshot =
            ScheduleSnapshot::build(&context, DayIndex::FIRST, Vec::new(), 4).unwrap();
        let grid = render_text_grid(&snapshot, &[]);
        assert!(grid.ends_with("(no sessions)\n"));
    }
}
