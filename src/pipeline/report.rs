//! Audit report: one `<name> (<id>)` line per processed channel, uploaded to the admin channel
//! with an announcement post when the run ends.

use anyhow::{Context, anyhow};
use log::{debug, info};

use crate::error::ArchiverError;
use crate::notify::{FileRef, NotificationGateway};
use crate::types::{ChannelRef, ExitReason, RunMode};
use crate::utils::now_millis;

pub struct ReportEmitter {
    mode: RunMode,
    admin_channel: Option<String>,
    buffer: String,
    lines: usize,
}

impl ReportEmitter {
    pub fn new(mode: RunMode, admin_channel: Option<&str>) -> Self {
        let header = match mode {
            RunMode::Archive => "Archived Channels:\n",
            RunMode::List => "Stale Channels:\n",
        };
        Self {
            mode,
            admin_channel: admin_channel.map(str::to_string),
            buffer: String::from(header),
            lines: 0,
        }
    }

    /// Append a channel. Archive runs only buffer when there is somewhere to deliver to.
    pub fn record(&mut self, channel: &ChannelRef) {
        if self.mode == RunMode::Archive && self.admin_channel.is_none() {
            return;
        }
        self.buffer.push_str(&channel.report_line());
        self.buffer.push('\n');
        self.lines += 1;
    }

    /// `<epoch_ms>_<archived|stale>-channels.txt`
    pub fn file_name(&self, completed_at_ms: i64) -> String {
        format!("{}_{}-channels.txt", completed_at_ms, self.mode.report_kind())
    }

    pub fn announcement(&self, exit: ExitReason) -> &'static str {
        match (self.mode, exit) {
            (RunMode::Archive, ExitReason::Completed) => "The following channels have been archived:",
            (RunMode::Archive, ExitReason::Cancelled) => {
                "The following channels were archived before the run was canceled:"
            }
            (RunMode::Archive, ExitReason::Error) => {
                "The following channels were archived before the run failed:"
            }
            (RunMode::List, ExitReason::Completed) => {
                "The following channels have been identified as stale:"
            }
            (RunMode::List, ExitReason::Cancelled) => {
                "The following stale channels were found before the run was canceled:"
            }
            (RunMode::List, ExitReason::Error) => {
                "The following stale channels were found before the run failed:"
            }
        }
    }

    /// Upload the buffer and announce it in the admin channel. No admin channel → no-op.
    pub fn deliver(
        &self,
        gateway: Option<&dyn NotificationGateway>,
        exit: ExitReason,
    ) -> Result<Option<FileRef>, ArchiverError> {
        let Some(ref admin) = self.admin_channel else {
            debug!("No admin channel configured; skipping report");
            return Ok(None);
        };
        let gateway = gateway.ok_or_else(|| {
            ArchiverError::ReportDelivery(anyhow!(
                "admin channel {admin} set but no notification gateway configured"
            ))
        })?;

        let file_name = self.file_name(now_millis());
        let file = gateway
            .upload_file(self.buffer.as_bytes(), &file_name, admin)
            .context("failed to upload file")
            .map_err(ArchiverError::ReportDelivery)?;
        gateway
            .post_with_attachment(admin, self.announcement(exit), &file)
            .context("failed to create post")
            .map_err(ArchiverError::ReportDelivery)?;
        info!(
            "Report {} ({} channels) delivered to {}",
            file.name, self.lines, admin
        );
        Ok(Some(file))
    }
}
