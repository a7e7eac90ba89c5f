mod axis;
mod layout;
mod locator;
mod refresh;
mod snapshot;
mod time;
mod types;

pub use axis::{Tick, Ticks, TimeAxis};
pub use layout::RoomLayoutCalculator;
pub use locator::{LocateTarget, TemporalLocator};
pub use refresh::{plan_refresh, should_rebuild, ParseOutcome, RefreshPlan, ReloadSignals};
pub use snapshot::{RoomColumn, ScheduleContext, ScheduleSnapshot};
pub use time::{
    format_minute_of_day, minute_of_day, normalize_minute, TimeFrame, FIFTEEN_MINUTES,
    FIVE_MINUTES, ONE_DAY, UNITS_PER_TICK,
};
pub use types::{DayIndex, FlagChange, Geometry, RoomPartition, ScrollTarget, Session};
