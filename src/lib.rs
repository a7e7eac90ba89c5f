//! Temporal layout engine for a conference schedule grid.
//!
//! Sessions of one day are partitioned into room columns, given a vertical
//! offset and height from their start and duration, and the grid can be
//! scrolled to "now" or to a deep-linked session.

pub mod config;
pub mod error;
pub mod repository;
pub mod schedule;
pub mod ui;

pub use config::{ClockFormat, Config};
pub use error::{ParseFailure, ScheduleError};
pub use repository::{Dataset, InMemoryRepository, ScheduleRepository};
pub use schedule::{DayIndex, ScheduleSnapshot, ScrollTarget, Session};
