//! Cooperative cancellation shared between a run and whoever may stop it (Ctrl+C, scheduler, tests).

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Cancellation flag plus a wake-up channel so pauses end as soon as cancel is requested.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded::<()>(1);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Pause for `timeout`, returning early if cancelled. Returns true when cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        if timeout.is_zero() {
            return false;
        }
        select! {
            recv(self.wake_rx) -> _ => {
                // Re-arm so other clones blocked in wait() also wake.
                let _ = self.wake_tx.try_send(());
            }
            default(timeout) => {}
        }
        self.is_cancelled()
    }

    /// Cancel on Ctrl+C. Only one handler can be installed per process.
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            log::info!("Cancellation requested (Ctrl+C); stopping after the current channel...");
            token.cancel();
        })
        .context("set Ctrl+C handler")
    }
}
