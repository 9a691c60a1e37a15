//! Reply text for the invoking user. Pure formatting; sending is the caller's job.

use crate::pipeline::RunOutcome;
use crate::types::{ChannelRef, RunMode};
use crate::utils::config::REPLY_CHUNK;

/// Final reply for a run. `admin_name` is the resolved name of the report channel, if any.
pub fn summary_reply(mode: RunMode, outcome: &RunOutcome, admin_name: Option<&str>) -> String {
    if let Some(ref e) = outcome.error {
        return format!("Error archiving channels: {e}");
    }
    let result = &outcome.result;
    match (mode, admin_name) {
        (RunMode::Archive, Some(name)) => format!(
            "{} channels archived in {:?}. Archived channel list uploaded to {}.\n{}",
            result.count(),
            result.duration,
            name,
            result.exit_reason
        ),
        (RunMode::Archive, None) => format!(
            "{} channels archived in {:?}.\n{}",
            result.count(),
            result.duration,
            result.exit_reason
        ),
        (RunMode::List, Some(name)) => format!("Channel list uploaded to {name}."),
        (RunMode::List, None) => format!("count: {}\n{}", result.count(), result.exit_reason),
    }
}

/// Channel list split into replies of at most [`REPLY_CHUNK`] lines each.
pub fn list_chunks(channels: &[ChannelRef]) -> Vec<String> {
    let total = channels.len();
    channels
        .chunks(REPLY_CHUNK)
        .enumerate()
        .map(|(i, chunk)| {
            let start = i * REPLY_CHUNK + 1;
            let end = start + chunk.len() - 1;
            let mut msg = format!("Stale channels {start} to {end} of {total}\n");
            for ch in chunk {
                msg.push_str(&format!("**{}** ({})\n", ch.name, ch.id));
            }
            msg
        })
        .collect()
}

pub fn progress_reply(archived: usize) -> String {
    format!("Channel-archiver progress -- {archived} channels archived.")
}
