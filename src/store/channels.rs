//! Channel mutation and lookup, plus the post/file writes the bot needs.

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use rusqlite::{OptionalExtension, params};

use crate::types::{ChannelInfo, ChannelType, PageRequest, PageResult, StaleChannelCriteria};
use crate::utils::now_millis;

use super::{ChannelStore, SqlStore};

/// Handle to an uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRef {
    pub id: String,
    pub name: String,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl SqlStore {
    /// Soft-delete at an explicit time. Already archived → no-op; unknown id → error.
    pub fn archive_channel_at(&self, id: &str, now_ms: i64) -> Result<()> {
        let changed = self
            .conn()
            .execute(
                "UPDATE Channels SET DeleteAt = ?1, UpdateAt = ?1 WHERE Id = ?2 AND DeleteAt = 0",
                params![now_ms, id],
            )
            .context("update channel DeleteAt")?;
        if changed > 0 {
            return Ok(());
        }
        let delete_at: Option<i64> = self
            .conn()
            .query_row(
                "SELECT DeleteAt FROM Channels WHERE Id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()
            .context("look up channel")?;
        match delete_at {
            Some(_) => {
                debug!("Channel {} already archived", id);
                Ok(())
            }
            None => bail!("channel {id} not found"),
        }
    }

    /// Insert a post into `channel_id`; returns the new post id.
    pub fn create_post(
        &self,
        channel_id: &str,
        user_id: &str,
        message: &str,
        file_ids: &[String],
    ) -> Result<String> {
        let id = new_id();
        let now = now_millis();
        self.conn()
            .execute(
                "INSERT INTO Posts (Id, ChannelId, UserId, Message, FileIds, CreateAt, UpdateAt, DeleteAt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0)",
                params![id, channel_id, user_id, message, file_ids.join(","), now],
            )
            .context("insert post")?;
        Ok(id)
    }

    /// Store file bytes attached to `channel_id`.
    pub fn store_file(&self, content: &[u8], name: &str, channel_id: &str) -> Result<FileRef> {
        let id = new_id();
        self.conn()
            .execute(
                "INSERT INTO FileInfo (Id, ChannelId, Name, Size, Content, CreateAt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    channel_id,
                    name,
                    content.len() as i64,
                    content,
                    now_millis()
                ],
            )
            .context("insert file")?;
        Ok(FileRef {
            id,
            name: name.to_string(),
        })
    }
}

impl ChannelStore for SqlStore {
    fn fetch_stale_channels(
        &self,
        criteria: &StaleChannelCriteria,
        page: PageRequest,
    ) -> Result<PageResult> {
        self.fetch_stale_channels_at(criteria, page, now_millis())
    }

    fn archive_channel(&self, id: &str) -> Result<()> {
        self.archive_channel_at(id, now_millis())
    }

    fn get_channel(&self, id: &str) -> Result<ChannelInfo> {
        let row = self
            .conn()
            .query_row(
                "SELECT Id, Name, DisplayName, Type, UpdateAt, DeleteAt FROM Channels WHERE Id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()
            .context("look up channel")?;
        let (id, name, display_name, type_str, update_at, delete_at) =
            row.ok_or_else(|| anyhow!("channel {id} not found"))?;
        let channel_type = ChannelType::from_db_str(&type_str)
            .ok_or_else(|| anyhow!("channel {id} has unknown type {type_str:?}"))?;
        Ok(ChannelInfo {
            id,
            name,
            display_name,
            channel_type,
            update_at,
            delete_at,
        })
    }
}
