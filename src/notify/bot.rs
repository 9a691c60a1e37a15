use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;

use crate::store::{FileRef, SqlStore};
use crate::utils::config::BotIdentity;

use super::NotificationGateway;

/// Gateway that posts as the archiver bot into the same database it archives.
/// Ephemeral replies are never stored; they go to the invoking terminal.
pub struct BotNotifier<'a> {
    store: &'a SqlStore,
    bot_user_id: String,
}

impl<'a> BotNotifier<'a> {
    pub fn new(store: &'a SqlStore) -> Self {
        Self {
            store,
            bot_user_id: BotIdentity::USER_ID.to_string(),
        }
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }
}

impl NotificationGateway for BotNotifier<'_> {
    fn send_channel_notice(&self, channel_id: &str, text: &str) -> Result<()> {
        self.store
            .create_post(channel_id, &self.bot_user_id, text, &[])
            .with_context(|| format!("post notice to {channel_id}"))?;
        Ok(())
    }

    fn send_ephemeral_reply(&self, channel_id: &str, user_id: &str, text: &str) -> Result<()> {
        debug!("Ephemeral reply in {} for {}", channel_id, user_id);
        let label = format!("[{}]", BotIdentity::DISPLAY_NAME).cyan().bold();
        println!("{} {}", label, text);
        Ok(())
    }

    fn upload_file(&self, content: &[u8], filename: &str, channel_id: &str) -> Result<FileRef> {
        self.store
            .store_file(content, filename, channel_id)
            .with_context(|| format!("upload {filename} to {channel_id}"))
    }

    fn post_with_attachment(&self, channel_id: &str, text: &str, file: &FileRef) -> Result<()> {
        self.store
            .create_post(
                channel_id,
                &self.bot_user_id,
                text,
                std::slice::from_ref(&file.id),
            )
            .with_context(|| format!("post attachment {} to {channel_id}", file.name))?;
        Ok(())
    }
}
