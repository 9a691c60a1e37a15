use log::{debug, info, warn};
use std::collections::HashSet;

use anyhow::anyhow;

use crate::error::ArchiverError;
use crate::notify::NotificationGateway;
use crate::pipeline::{CancelToken, ReportEmitter, RunOutcome, guarded_run};
use crate::store::ChannelStore;
use crate::types::{
    ExitReason, PageRequest, PageResult, RunMode, RunResult, StaleChannelCriteria,
};
use crate::utils::config::Pauses;

/// What to run: criteria, mode, batch size, pacing.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub criteria: StaleChannelCriteria,
    pub mode: RunMode,
    /// Page size for every fetch. 0 fetches all candidates at once.
    pub batch_size: usize,
    pub pauses: Pauses,
}

/// Collaborators for one run.
pub struct RunParams<'a> {
    pub store: &'a dyn ChannelStore,
    /// Pre-archive notices and report delivery. `None` skips notices; a report then fails to deliver.
    pub gateway: Option<&'a dyn NotificationGateway>,
    pub cancel: &'a CancelToken,
    /// Called after each archive page with the results so far.
    pub on_progress: Option<Box<dyn FnMut(&RunResult) + 'a>>,
}

/// Notice posted in a channel right before it is archived.
pub fn archive_notice(age_in_days: u32) -> String {
    format!(
        "This channel has been archived due to inactivity for more than {} days.",
        age_in_days
    )
}

/// Loop state shared by both modes.
struct RunLoop<'r, 'a> {
    request: &'r RunRequest,
    store: &'a dyn ChannelStore,
    gateway: Option<&'a dyn NotificationGateway>,
    cancel: &'a CancelToken,
    report: ReportEmitter,
}

impl RunLoop<'_, '_> {
    fn cancelled(&self, result: &mut RunResult) {
        info!(
            "Run cancelled after {} channels; nothing further will be processed",
            result.count()
        );
        result.exit_reason = ExitReason::Cancelled;
    }

    fn fetch(&self, page: PageRequest) -> Result<PageResult, ArchiverError> {
        self.store
            .fetch_stale_channels(&self.request.criteria, page)
            .map_err(ArchiverError::DataAccess)
    }

    /// Read-only: walk pages with an advancing offset.
    fn list(&mut self, result: &mut RunResult) -> Result<(), ArchiverError> {
        let mut page = 0;
        loop {
            if self.cancel.is_cancelled() {
                self.cancelled(result);
                return Ok(());
            }
            let batch = self.fetch(PageRequest::new(page, self.request.batch_size))?;
            page += 1;

            for channel in &batch.items {
                result.channels.push(channel.clone());
                self.report.record(channel);
                if self.cancel.wait(self.request.pauses.between_items) {
                    self.cancelled(result);
                    return Ok(());
                }
            }

            if !batch.has_more {
                return Ok(());
            }
        }
    }

    /// Mutating: always re-fetch page 0. Archived channels leave the candidate pool, so the
    /// first page is always the next batch; advancing the offset would skip channels.
    fn archive(
        &mut self,
        result: &mut RunResult,
        on_progress: &mut Option<Box<dyn FnMut(&RunResult) + '_>>,
    ) -> Result<(), ArchiverError> {
        let page = PageRequest::new(0, self.request.batch_size);
        let notice = archive_notice(self.request.criteria.age_in_days);
        let mut archived: HashSet<String> = HashSet::new();

        loop {
            if self.cancel.is_cancelled() {
                self.cancelled(result);
                return Ok(());
            }
            let batch = self.fetch(page)?;

            for channel in &batch.items {
                if archived.contains(&channel.id) {
                    // Still selected after a successful archive: re-fetching page 0 would never end.
                    return Err(ArchiverError::Mutation {
                        id: channel.id.clone(),
                        name: channel.name.clone(),
                        source: anyhow!("channel still selected as stale after archive"),
                    });
                }

                if let Some(gateway) = self.gateway
                    && let Err(e) = gateway.send_channel_notice(&channel.id, &notice)
                {
                    warn!("Notice to {} failed: {:#}", channel.report_line(), e);
                }

                self.store
                    .archive_channel(&channel.id)
                    .map_err(|source| ArchiverError::Mutation {
                        id: channel.id.clone(),
                        name: channel.name.clone(),
                        source,
                    })?;
                debug!("Archived {}", channel.report_line());

                archived.insert(channel.id.clone());
                result.channels.push(channel.clone());
                self.report.record(channel);

                if self.cancel.wait(self.request.pauses.between_items) {
                    self.cancelled(result);
                    return Ok(());
                }
            }

            if let Some(cb) = on_progress.as_mut() {
                cb(&*result);
            }

            if !batch.has_more {
                return Ok(());
            }

            if self.cancel.wait(self.request.pauses.between_pages) {
                self.cancelled(result);
                return Ok(());
            }
        }
    }

    /// Deliver the report after the loop. On a failed loop the primary error wins; delivery of the
    /// partial report is attempted and only logged.
    fn finish(
        &self,
        result: &RunResult,
        loop_result: Result<(), ArchiverError>,
    ) -> Result<(), ArchiverError> {
        match loop_result {
            Ok(()) => self.report.deliver(self.gateway, result.exit_reason).map(|_| ()),
            Err(e) => {
                if result.count() > 0
                    && let Err(delivery) = self.report.deliver(self.gateway, ExitReason::Error)
                {
                    warn!("Partial report not delivered: {}", delivery);
                }
                Err(e)
            }
        }
    }
}

/// Run one list or archive pass. Always returns a finalized [`RunOutcome`]: duration stamped,
/// exit reason reconciled, panics converted to `UnexpectedFault`.
pub fn run(request: &RunRequest, params: RunParams<'_>) -> RunOutcome {
    let RunParams {
        store,
        gateway,
        cancel,
        mut on_progress,
    } = params;
    let criteria = &request.criteria;
    debug!(
        "Stale channel run: mode={:?} age_in_days={} batch_size={} exclude={:?} types={:?} admin={:?}",
        request.mode,
        criteria.age_in_days,
        request.batch_size,
        criteria.exclude_channels,
        criteria.include_types,
        criteria.admin_channel_id
    );

    let mut run_loop = RunLoop {
        request,
        store,
        gateway,
        cancel,
        report: ReportEmitter::new(request.mode, criteria.admin_channel_id.as_deref()),
    };

    let outcome = guarded_run(|result| {
        let loop_result = match request.mode {
            RunMode::List => run_loop.list(result),
            RunMode::Archive => run_loop.archive(result, &mut on_progress),
        };
        run_loop.finish(result, loop_result)
    });

    let verb = match request.mode {
        RunMode::List => "listed",
        RunMode::Archive => "archived",
    };
    match outcome.error {
        None => info!(
            "{} channels {} in {:?} ({})",
            outcome.result.count(),
            verb,
            outcome.result.duration,
            outcome.result.exit_reason
        ),
        Some(ref e) => warn!(
            "{} channels {} in {:?} before {} error: {}",
            outcome.result.count(),
            verb,
            outcome.result.duration,
            e.kind(),
            e
        ),
    }
    outcome
}
