//! Errors surfaced by an archive or list run. Each run yields at most one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiverError {
    /// Staleness query failed; the run stops.
    #[error("cannot fetch stale channels: {0:#}")]
    DataAccess(#[source] anyhow::Error),

    /// Archive mutation failed on a candidate; earlier candidates stay archived.
    #[error("cannot archive channel {name} ({id}): {source:#}")]
    Mutation {
        id: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Audit upload or announcement failed after the archival work finished.
    #[error("failed to deliver report: {0:#}")]
    ReportDelivery(#[source] anyhow::Error),

    /// Panic or other fault caught at the run boundary.
    #[error("unexpected fault: {0}")]
    UnexpectedFault(String),
}

impl ArchiverError {
    /// True when the error leaves the archival outcome itself untouched.
    pub fn is_report_only(&self) -> bool {
        matches!(self, ArchiverError::ReportDelivery(_))
    }

    /// Short static label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ArchiverError::DataAccess(_) => "data_access",
            ArchiverError::Mutation { .. } => "mutation",
            ArchiverError::ReportDelivery(_) => "report_delivery",
            ArchiverError::UnexpectedFault(_) => "unexpected_fault",
        }
    }
}
