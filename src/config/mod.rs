use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::schedule::{TemporalLocator, FIFTEEN_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Height of one 5-minute step before density scaling.
    #[serde(default = "default_box_height")]
    pub box_height: u32,
    #[serde(default = "default_display_density")]
    pub display_density: f32,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default = "default_now_window")]
    pub now_window_minutes: u32,
    /// Off in landscape, where no single column is in focus.
    #[serde(default = "default_true")]
    pub correct_to_visible_column: bool,
}

fn default_box_height() -> u32 {
    17
}

fn default_display_density() -> f32 {
    1.0
}

fn default_now_window() -> u32 {
    FIFTEEN_MINUTES
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            box_height: default_box_height(),
            display_density: default_display_density(),
            clock_format: ClockFormat::Hour24,
            now_window_minutes: default_now_window(),
            correct_to_visible_column: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents)
                .context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "schedule-grid", "schedule-grid")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Layout units per 5 minutes, scaled to the display.
    pub fn unit_height(&self) -> u32 {
        let scaled = (self.box_height as f32 * self.display_density).floor();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled as u32
        } else {
            1
        }
    }

    pub fn locator(&self) -> TemporalLocator {
        TemporalLocator::new()
            .with_match_window(self.now_window_minutes)
            .with_column_correction(self.correct_to_visible_column)
    }
}
