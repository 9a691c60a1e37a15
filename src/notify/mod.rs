//! Bot-style messaging used by the pipeline and the command layer.

mod bot;

pub use bot::BotNotifier;
pub use crate::store::FileRef;

use anyhow::Result;

/// Messaging transport. Calls are synchronous; failures come back as errors and the caller decides
/// whether they matter (pre-archive notices are best-effort, report delivery is not).
pub trait NotificationGateway {
    /// Visible post in `channel_id`.
    fn send_channel_notice(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Reply only the invoking user sees.
    fn send_ephemeral_reply(&self, channel_id: &str, user_id: &str, text: &str) -> Result<()>;

    fn upload_file(&self, content: &[u8], filename: &str, channel_id: &str) -> Result<FileRef>;

    /// Post `text` to `channel_id` with `file` attached.
    fn post_with_attachment(&self, channel_id: &str, text: &str, file: &FileRef) -> Result<()>;
}
