//! chanarchiver: find channels with no activity past an age threshold and archive them in
//! bounded, cancellable batches with an audit report.

pub mod engine;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::ArchiverError;
pub use types::*;

pub use notify::{BotNotifier, NotificationGateway};
pub use pipeline::{CancelToken, RunOutcome, RunRequest};
pub use store::{ChannelStore, SqlStore};

use log::debug;

/// Result alias used by public chanarchiver API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: list or archive stale channels matching `criteria`.
///
/// - **`mode: List`** → read-only; every matching channel is returned and, when an admin channel is
///   set, reported there.
/// - **`mode: Archive`** → each candidate gets a notice (when `gateway` is set), then is archived.
///   The first failed archive stops the run.
///
/// `batch_size` is the page size (0 = everything in one page). `on_progress` runs after each archive
/// batch. The returned [`RunOutcome`] is always finalized, including after a panic inside the run.
///
/// ```ignore
/// let store = chanarchiver::store::open_db(path)?;
/// let cancel = chanarchiver::CancelToken::new();
/// let criteria = chanarchiver::StaleChannelCriteria::new(90).with_excludes(["announcements"]);
/// let outcome = chanarchiver::archive_stale_channels(
///     &store, None, &cancel, criteria, chanarchiver::RunMode::List, 1000, None,
/// );
/// ```
pub fn archive_stale_channels<'a>(
    store: &'a dyn ChannelStore,
    gateway: Option<&'a dyn NotificationGateway>,
    cancel: &'a CancelToken,
    criteria: StaleChannelCriteria,
    mode: RunMode,
    batch_size: usize,
    on_progress: Option<Box<dyn FnMut(&RunResult) + 'a>>,
) -> RunOutcome {
    let request = RunRequest {
        criteria,
        mode,
        batch_size,
        pauses: utils::config::Pauses::default(),
    };
    debug!(
        "{} RUN:{:?} batch_size={}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        mode,
        batch_size
    );
    pipeline::run(
        &request,
        pipeline::RunParams {
            store,
            gateway,
            cancel,
            on_progress,
        },
    )
}
