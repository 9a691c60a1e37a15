pub mod archiver_toml;
pub mod config;
pub mod logger;

pub use archiver_toml::{
    ArchiverSection, ArchiverToml, check_bounds, load_archiver_toml, split_exclude_list,
};
pub use config::*;
pub use logger::{Colors, setup_logging};

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
