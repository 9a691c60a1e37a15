//! Public and internal types for the archiver API and pipeline.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::utils::config::RESERVED_CHANNEL_NAMES;

/// Minimal projection of a channel returned by the staleness query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

impl ChannelRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// One report line: `<name> (<id>)`.
    pub fn report_line(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// Channel kind as stored in the `Channels.Type` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChannelType {
    Open,
    Private,
    Direct,
    Group,
}

impl ChannelType {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ChannelType::Open => "O",
            ChannelType::Private => "P",
            ChannelType::Direct => "D",
            ChannelType::Group => "G",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "O" => Some(ChannelType::Open),
            "P" => Some(ChannelType::Private),
            "D" => Some(ChannelType::Direct),
            "G" => Some(ChannelType::Group),
            _ => None,
        }
    }
}

/// Full channel row, as returned by `get_channel`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub channel_type: ChannelType,
    /// Last update in epoch milliseconds.
    pub update_at: i64,
    /// Soft-delete marker in epoch milliseconds; 0 when live.
    pub delete_at: i64,
}

impl ChannelInfo {
    pub fn is_archived(&self) -> bool {
        self.delete_at != 0
    }
}

/// Staleness predicate and exclusion rules for one run. Built once per invocation, read-only afterwards.
#[derive(Clone, Debug)]
pub struct StaleChannelCriteria {
    /// Minimum days without any channel, post, or reaction activity.
    pub age_in_days: u32,
    /// Channel ids or names never selected.
    pub exclude_channels: BTreeSet<String>,
    /// Channel kinds eligible for selection.
    pub include_types: BTreeSet<ChannelType>,
    /// Audit channel receiving the report; always excluded from selection.
    pub admin_channel_id: Option<String>,
}

impl StaleChannelCriteria {
    /// Criteria for open and private channels with no explicit excludes.
    pub fn new(age_in_days: u32) -> Self {
        Self {
            age_in_days,
            exclude_channels: BTreeSet::new(),
            include_types: [ChannelType::Open, ChannelType::Private].into_iter().collect(),
            admin_channel_id: None,
        }
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_channels.extend(excludes.into_iter().map(Into::into));
        self
    }

    pub fn with_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ChannelType>,
    {
        self.include_types = types.into_iter().collect();
        self
    }

    pub fn with_admin_channel(mut self, admin_channel_id: Option<String>) -> Self {
        self.admin_channel_id = admin_channel_id.filter(|s| !s.is_empty());
        self
    }

    /// Explicit excludes plus reserved channel names plus the admin channel id.
    pub fn effective_excludes(&self) -> BTreeSet<String> {
        let mut set = self.exclude_channels.clone();
        set.extend(RESERVED_CHANNEL_NAMES.iter().map(|s| s.to_string()));
        if let Some(ref admin) = self.admin_channel_id {
            set.insert(admin.clone());
        }
        set
    }

    /// Cutoff in epoch milliseconds: everything at or after this counts as activity.
    pub fn cutoff_ms(&self, now_ms: i64) -> i64 {
        now_ms - i64::from(self.age_in_days) * MILLIS_PER_DAY
    }
}

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Page of the staleness query. `page_size == 0` disables pagination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Every match in one page.
    pub fn unbounded() -> Self {
        Self {
            page: 0,
            page_size: 0,
        }
    }
}

/// One page of candidates. `has_more` is true iff the query returned more than `page_size` rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<ChannelRef>,
    pub has_more: bool,
}

/// Whether a run mutates (archive) or only enumerates (list).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunMode {
    List,
    Archive,
}

impl RunMode {
    /// Tag used in the report file name.
    pub fn report_kind(&self) -> &'static str {
        match self {
            RunMode::List => "stale",
            RunMode::Archive => "archived",
        }
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    Completed,
    Cancelled,
    Error,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Completed => "completed normally",
            ExitReason::Cancelled => "canceled",
            ExitReason::Error => "error",
        };
        f.write_str(s)
    }
}

/// Per-run accumulator, owned by the run that created it.
#[derive(Clone, Debug, Serialize)]
pub struct RunResult {
    /// Channels archived (archive mode) or listed (list mode), in processing order.
    pub channels: Vec<ChannelRef>,
    pub exit_reason: ExitReason,
    /// Stamped once when the run is finalized.
    pub duration: Duration,
    /// Run start in epoch milliseconds.
    pub started_at_ms: i64,
}

impl RunResult {
    pub fn new(started_at_ms: i64) -> Self {
        Self {
            channels: Vec::new(),
            exit_reason: ExitReason::Completed,
            duration: Duration::ZERO,
            started_at_ms,
        }
    }

    pub fn count(&self) -> usize {
        self.channels.len()
    }
}
