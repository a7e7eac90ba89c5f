use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use schedule_grid::repository::{Dataset, InMemoryRepository};
use schedule_grid::schedule::DayIndex;
use schedule_grid::ui::{render_text_grid, ScheduleScreen};
use schedule_grid::Config;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let Some(dataset_path) = args.next().map(PathBuf::from) else {
        bail!("usage: schedule-grid <dataset.json> [day]");
    };
    let day = args
        .next()
        .map(|arg| arg.parse::<u32>().context("Day must be a positive number"))
        .transpose()?
        .map(DayIndex::new);

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default config: {:#}", e);
        Config::default()
    });
    let dataset = Dataset::load(&dataset_path)?;
    tracing::info!(
        sessions = dataset.sessions.len(),
        days = dataset.days.len(),
        "Loaded {}",
        dataset_path.display()
    );

    let mut screen = ScheduleScreen::new(InMemoryRepository::new(dataset), config);
    let now = Utc::now();
    let mut target = screen.activate(now)?;
    if let Some(day) = day {
        if screen.choose_day(day)?.is_some() {
            target = Some(screen.locate_now(now));
        }
    }

    let Some(snapshot) = screen.snapshot() else {
        println!("No schedule data.");
        return Ok(());
    };
    for rejected in snapshot.rejected() {
        tracing::warn!("{}", rejected);
    }

    println!("Day {} ({})", snapshot.day(), snapshot.date());
    print!("{}", render_text_grid(snapshot, &screen.ticks(now)));
    if let Some(target) = target {
        println!(
            "Scroll to offset {} in column {}",
            target.vertical_offset, target.column_index
        );
    }
    Ok(())
}
