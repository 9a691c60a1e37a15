//! Shared fixtures: seed channels/posts/reactions, move timestamps, and test doubles for the
//! store and gateway.
#![allow(dead_code)]

use chanarchiver::notify::{FileRef, NotificationGateway};
use chanarchiver::pipeline::CancelToken;
use chanarchiver::store::{ChannelStore, SqlStore, open_db_in_memory};
use chanarchiver::utils::now_millis;
use chanarchiver::{ChannelInfo, ChannelRef, ChannelType, PageRequest, PageResult, StaleChannelCriteria};
use rusqlite::params;
use std::cell::{Cell, RefCell};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn year_ago() -> i64 {
    now_millis() - 365 * DAY_MS
}

pub fn week_ago() -> i64 {
    now_millis() - 7 * DAY_MS
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub struct Fixture {
    pub store: SqlStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: open_db_in_memory().unwrap(),
        }
    }

    /// `num` open channels named `<prefix>-<i>`, created now (so not stale).
    pub fn create_channels(&self, num: usize, prefix: &str) -> Vec<ChannelRef> {
        self.create_channels_of_type(num, prefix, ChannelType::Open)
    }

    pub fn create_channels_of_type(
        &self,
        num: usize,
        prefix: &str,
        channel_type: ChannelType,
    ) -> Vec<ChannelRef> {
        let now = now_millis();
        (0..num)
            .map(|i| {
                let ch = ChannelRef::new(new_id(), format!("{prefix}-{i}"));
                self.insert_channel(&ch, channel_type, now);
                ch
            })
            .collect()
    }

    /// Insert a channel with a fixed id (e.g. reserved names).
    pub fn insert_channel(&self, ch: &ChannelRef, channel_type: ChannelType, at: i64) {
        self.store
            .conn()
            .execute(
                "INSERT INTO Channels (Id, Name, DisplayName, Type, CreateAt, UpdateAt, DeleteAt)
                 VALUES (?1, ?2, ?2, ?3, ?4, ?4, 0)",
                params![ch.id, ch.name, channel_type.as_db_str(), at],
            )
            .unwrap();
    }

    pub fn create_posts(&self, num: usize, channel_id: &str) -> Vec<String> {
        (0..num)
            .map(|i| {
                self.store
                    .create_post(channel_id, "user1", &format!("message {i}"), &[])
                    .unwrap()
            })
            .collect()
    }

    pub fn create_reactions(&self, post_ids: &[String]) {
        let now = now_millis();
        for post_id in post_ids {
            self.store
                .conn()
                .execute(
                    "INSERT INTO Reactions (UserId, PostId, EmojiName, CreateAt, UpdateAt, DeleteAt)
                     VALUES ('user1', ?1, 'smile', ?2, ?2, 0)",
                    params![post_id, now],
                )
                .unwrap();
        }
    }

    /// Channel with `posts` posts, each with one reaction.
    pub fn populate(&self, channel_id: &str, posts: usize) {
        let ids = self.create_posts(posts, channel_id);
        self.create_reactions(&ids);
    }

    /// Set CreateAt/UpdateAt/DeleteAt for a channel, or for all its posts, or all its reactions.
    pub fn set_timestamps(&self, table: &str, channel_id: &str, create: i64, update: i64, delete: i64) {
        let sql = match table {
            "Channels" => "UPDATE Channels SET CreateAt = ?1, UpdateAt = ?2, DeleteAt = ?3 WHERE Id = ?4",
            "Posts" => "UPDATE Posts SET CreateAt = ?1, UpdateAt = ?2, DeleteAt = ?3 WHERE ChannelId = ?4",
            "Reactions" => {
                "UPDATE Reactions SET CreateAt = ?1, UpdateAt = ?2, DeleteAt = ?3
                 WHERE PostId IN (SELECT Id FROM Posts WHERE ChannelId = ?4)"
            }
            other => panic!("unknown table {other}"),
        };
        self.store
            .conn()
            .execute(sql, params![create, update, delete, channel_id])
            .unwrap();
    }

    /// Channel plus its posts and reactions all a year old.
    pub fn make_stale(&self, channel_id: &str) {
        let old = year_ago();
        self.set_timestamps("Channels", channel_id, old, old, 0);
        self.set_timestamps("Posts", channel_id, old, old, 0);
        self.set_timestamps("Reactions", channel_id, old, old, 0);
    }

    pub fn delete_at(&self, channel_id: &str) -> i64 {
        self.store
            .conn()
            .query_row(
                "SELECT DeleteAt FROM Channels WHERE Id = ?1",
                [channel_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    pub fn posts_by(&self, channel_id: &str, user_id: &str) -> Vec<(String, String)> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT Message, FileIds FROM Posts WHERE ChannelId = ?1 AND UserId = ?2 ORDER BY CreateAt")
            .unwrap();
        stmt.query_map([channel_id, user_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }
}

pub fn ids(channels: &[ChannelRef]) -> Vec<String> {
    let mut v: Vec<String> = channels.iter().map(|c| c.id.clone()).collect();
    v.sort();
    v
}

/// Gateway that records every call; upload/notice can be made to fail.
#[derive(Default)]
pub struct RecordingGateway {
    pub notices: RefCell<Vec<(String, String)>>,
    pub replies: RefCell<Vec<String>>,
    pub uploads: RefCell<Vec<(String, String, String)>>,
    pub posts: RefCell<Vec<(String, String, FileRef)>>,
    pub fail_notice: bool,
    pub fail_upload: bool,
}

impl NotificationGateway for RecordingGateway {
    fn send_channel_notice(&self, channel_id: &str, text: &str) -> anyhow::Result<()> {
        if self.fail_notice {
            anyhow::bail!("notice transport down");
        }
        self.notices
            .borrow_mut()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    fn send_ephemeral_reply(&self, _channel_id: &str, _user_id: &str, text: &str) -> anyhow::Result<()> {
        self.replies.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn upload_file(&self, content: &[u8], filename: &str, channel_id: &str) -> anyhow::Result<FileRef> {
        if self.fail_upload {
            anyhow::bail!("upload rejected");
        }
        self.uploads.borrow_mut().push((
            filename.to_string(),
            channel_id.to_string(),
            String::from_utf8(content.to_vec()).unwrap(),
        ));
        Ok(FileRef {
            id: "file1".to_string(),
            name: filename.to_string(),
        })
    }

    fn post_with_attachment(&self, channel_id: &str, text: &str, file: &FileRef) -> anyhow::Result<()> {
        self.posts
            .borrow_mut()
            .push((channel_id.to_string(), text.to_string(), file.clone()));
        Ok(())
    }
}

/// Store wrapper that injects faults and records fetches.
pub struct FaultyStore<'a> {
    pub inner: &'a SqlStore,
    pub fetches: RefCell<Vec<PageRequest>>,
    pub archives: Cell<usize>,
    /// Fail the n-th archive call (1-based).
    pub fail_archive_on: Option<usize>,
    /// Fail the n-th fetch (1-based).
    pub fail_fetch_on: Option<usize>,
    pub panic_on_fetch: bool,
    /// Cancel this token after the n-th successful archive.
    pub cancel_after: Option<(usize, CancelToken)>,
    /// Cancel this token while serving the n-th fetch (1-based).
    pub cancel_on_fetch: Option<(usize, CancelToken)>,
    /// Report success without archiving anything.
    pub archive_is_noop: bool,
}

impl<'a> FaultyStore<'a> {
    pub fn new(inner: &'a SqlStore) -> Self {
        Self {
            inner,
            fetches: RefCell::new(Vec::new()),
            archives: Cell::new(0),
            fail_archive_on: None,
            fail_fetch_on: None,
            panic_on_fetch: false,
            cancel_after: None,
            cancel_on_fetch: None,
            archive_is_noop: false,
        }
    }
}

impl ChannelStore for FaultyStore<'_> {
    fn fetch_stale_channels(&self, criteria: &StaleChannelCriteria, page: PageRequest) -> anyhow::Result<PageResult> {
        self.fetches.borrow_mut().push(page);
        if self.panic_on_fetch {
            panic!("store exploded");
        }
        let n = self.fetches.borrow().len();
        if self.fail_fetch_on == Some(n) {
            anyhow::bail!("database is locked");
        }
        if let Some((on, token)) = &self.cancel_on_fetch
            && *on == n
        {
            token.cancel();
        }
        self.inner.fetch_stale_channels(criteria, page)
    }

    fn archive_channel(&self, id: &str) -> anyhow::Result<()> {
        let n = self.archives.get() + 1;
        self.archives.set(n);
        if self.fail_archive_on == Some(n) {
            anyhow::bail!("permission denied");
        }
        if !self.archive_is_noop {
            self.inner.archive_channel(id)?;
        }
        if let Some((after, token)) = &self.cancel_after
            && *after == n
        {
            token.cancel();
        }
        Ok(())
    }

    fn get_channel(&self, id: &str) -> anyhow::Result<ChannelInfo> {
        self.inner.get_channel(id)
    }
}
