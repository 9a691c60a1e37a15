//! Run boundary: owns the [`RunResult`] and finalizes it exactly once, whatever way the body exits.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::error::ArchiverError;
use crate::types::{ExitReason, RunResult};
use crate::utils::now_millis;

/// Finalized run: the accumulated result and the single error the run produced, if any.
#[derive(Debug)]
pub struct RunOutcome {
    pub result: RunResult,
    pub error: Option<ArchiverError>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Split into result and error, for callers that prefer `Result`.
    pub fn into_result(self) -> Result<RunResult, (RunResult, ArchiverError)> {
        match self.error {
            None => Ok(self.result),
            Some(e) => Err((self.result, e)),
        }
    }
}

/// Holds the result while the body runs. Only [`RunScope::guarded`] creates one, and it always
/// ends in `finish`.
struct RunScope {
    result: RunResult,
    started: Instant,
}

impl RunScope {
    fn begin() -> Self {
        Self {
            result: RunResult::new(now_millis()),
            started: Instant::now(),
        }
    }

    /// Stamp duration and reconcile the exit reason. Report-delivery errors leave it untouched.
    fn finish(mut self, outcome: std::thread::Result<Result<(), ArchiverError>>) -> RunOutcome {
        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(payload) => Some(ArchiverError::UnexpectedFault(format!(
                "panic recovered: {}",
                panic_message(payload.as_ref())
            ))),
        };
        if let Some(ref e) = error
            && !e.is_report_only()
        {
            self.result.exit_reason = ExitReason::Error;
        }
        self.result.duration = self.started.elapsed();
        RunOutcome {
            result: self.result,
            error,
        }
    }

    /// Run `body` against a fresh result; panics are caught and become `UnexpectedFault`.
    fn guarded<F>(body: F) -> RunOutcome
    where
        F: FnOnce(&mut RunResult) -> Result<(), ArchiverError>,
    {
        let mut scope = RunScope::begin();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut scope.result)));
        scope.finish(outcome)
    }
}

/// Run `body` inside a finalizing scope. See [`RunOutcome`].
pub fn guarded_run<F>(body: F) -> RunOutcome
where
    F: FnOnce(&mut RunResult) -> Result<(), ArchiverError>,
{
    RunScope::guarded(body)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
