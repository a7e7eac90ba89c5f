mod app;
mod views;

pub use app::{DayUpdate, DeepLink, ParseReaction, ScheduleScreen};
pub use views::render_text_grid;
