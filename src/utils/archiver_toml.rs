//! Load `.chanarchiver.toml` (CLI only). The lib never reads it; callers build criteria directly.
//!
//! The `[archiver]` section carries the periodic-run settings. The trigger fields
//! (`frequency`, `day_of_week`, `time_of_day`) are kept for whatever scheduler invokes
//! `chanarchiver scheduled`; this crate does not interpret them.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use crate::utils::config::{AgeBounds, BatchBounds};

#[derive(Debug, Default, Deserialize)]
pub struct ArchiverToml {
    #[serde(default)]
    pub archiver: ArchiverSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ArchiverSection {
    pub enabled: bool,
    pub age_in_days: u32,
    pub frequency: Option<String>,
    pub day_of_week: Option<String>,
    pub time_of_day: Option<String>,
    /// Channel names or ids separated by commas and/or spaces.
    pub exclude_channels: String,
    pub batch_size: usize,
    pub admin_channel: Option<String>,
    /// List instead of archive.
    pub dry_run: bool,
}

impl Default for ArchiverSection {
    fn default() -> Self {
        Self {
            enabled: false,
            age_in_days: AgeBounds::DEFAULT,
            frequency: None,
            day_of_week: None,
            time_of_day: None,
            exclude_channels: String::new(),
            batch_size: BatchBounds::DEFAULT_ARCHIVE,
            admin_channel: None,
            dry_run: false,
        }
    }
}

impl ArchiverSection {
    /// Exclude entries split on commas and whitespace, empties dropped.
    pub fn exclude_list(&self) -> Vec<String> {
        split_exclude_list(&self.exclude_channels)
    }

    /// Admin channel id, treating an empty string as unset.
    pub fn admin_channel_id(&self) -> Option<String> {
        self.admin_channel.clone().filter(|s| !s.trim().is_empty())
    }

    /// Check numeric fields against their bounds.
    pub fn validate(&self) -> Result<()> {
        check_bounds(
            "age_in_days",
            self.age_in_days as usize,
            AgeBounds::MIN as usize,
            AgeBounds::MAX as usize,
        )?;
        check_bounds(
            "batch_size",
            self.batch_size,
            BatchBounds::MIN,
            BatchBounds::MAX,
        )?;
        Ok(())
    }
}

/// Split a configured exclude string: spaces are treated like commas.
pub fn split_exclude_list(s: &str) -> Vec<String> {
    s.replace(char::is_whitespace, ",")
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fail unless `min <= value <= max`.
pub fn check_bounds(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min {
        bail!("{name}: number must be greater than or equal to {min}");
    }
    if value > max {
        bail!("{name}: number must be less than or equal to {max}");
    }
    Ok(())
}

/// Load config from `path`. Missing file → defaults; unreadable or malformed file → error.
/// Bounds are not checked here: only `scheduled` runs from these numbers, see [`ArchiverSection::validate`].
pub fn load_archiver_toml(path: &Path) -> Result<ArchiverToml> {
    if !path.exists() {
        log::debug!("No config at {}; using defaults", path.display());
        return Ok(ArchiverToml::default());
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let file: ArchiverToml =
        toml::from_str(&s).with_context(|| format!("parse config {}", path.display()))?;
    Ok(file)
}
