//! Pipeline components: cancellation, run boundary, audit report, and the list/archive loop.

pub mod cancel;
pub mod orchestrator;
pub mod report;
pub mod scope;

pub use cancel::CancelToken;
pub use orchestrator::{RunParams, RunRequest, archive_notice, run};
pub use report::ReportEmitter;
pub use scope::{RunOutcome, guarded_run};
