//! Application configuration constants.
//! Bounds, defaults, and pacing in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    env_db_key: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                env_db_key: format!("{}_DB", pkg.to_uppercase()),
            }
        })
    }

    /// Default config file name looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Env var holding the database path when `--db` is not given.
    pub fn env_db_key(&self) -> &str {
        &self.env_db_key
    }
}

// ---- Staleness ----

/// Allowed range for `days`.
pub struct AgeBounds;

impl AgeBounds {
    pub const MIN: u32 = 30;
    pub const MAX: u32 = 10_000;
    pub const DEFAULT: u32 = 365;
}

/// Platform default channels never selected as stale.
pub const RESERVED_CHANNEL_NAMES: &[&str] = &["town-square", "off-topic"];

// ---- Batching ----

/// Allowed range and per-mode defaults for `batch-size`.
pub struct BatchBounds;

impl BatchBounds {
    pub const MIN: usize = 10;
    pub const MAX: usize = 10_000;
    pub const DEFAULT_ARCHIVE: usize = 100;
    pub const DEFAULT_LIST: usize = 1_000;

    pub fn default_for(list: bool) -> usize {
        if list {
            Self::DEFAULT_LIST
        } else {
            Self::DEFAULT_ARCHIVE
        }
    }
}

// ---- Pacing ----

/// Pauses between candidates and between pages. Cancellation is only sampled at these points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pauses {
    pub between_items: Duration,
    /// Longer so downstream events from the previous batch settle.
    pub between_pages: Duration,
}

impl Default for Pauses {
    fn default() -> Self {
        Self {
            between_items: Duration::from_millis(10),
            between_pages: Duration::from_millis(2000),
        }
    }
}

impl Pauses {
    /// No pacing at all (tests, offline databases).
    pub fn none() -> Self {
        Self {
            between_items: Duration::ZERO,
            between_pages: Duration::ZERO,
        }
    }
}

// ---- Bot / replies ----

/// Identity used for notices and report posts.
pub struct BotIdentity;

impl BotIdentity {
    pub const USER_ID: &'static str = "channel-archiver";
    pub const DISPLAY_NAME: &'static str = "Channel Archiver Bot";
}

/// Max channel lines per ephemeral list reply.
pub const REPLY_CHUNK: usize = 500;
