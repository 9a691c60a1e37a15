//! Data-access boundary: schema, open, staleness query, archive mutation, channel lookup.

mod channels;
mod connection;
mod stale;

pub use channels::FileRef;
pub use connection::{open_db, open_db_in_memory};
pub use stale::{StaleQuery, build_stale_query};

use anyhow::Result;
use rusqlite::Connection;

use crate::types::{ChannelInfo, PageRequest, PageResult, StaleChannelCriteria};

/// What the pipeline needs from storage. Implemented by [`SqlStore`]; tests may substitute their own.
pub trait ChannelStore {
    /// One page of channels meeting the staleness predicate, ordered by id.
    fn fetch_stale_channels(
        &self,
        criteria: &StaleChannelCriteria,
        page: PageRequest,
    ) -> Result<PageResult>;

    /// Soft-delete the channel. Archiving an already archived channel succeeds without change.
    fn archive_channel(&self, id: &str) -> Result<()>;

    fn get_channel(&self, id: &str) -> Result<ChannelInfo>;
}

/// SQLite-backed store over the platform tables.
pub struct SqlStore {
    conn: Connection,
}

impl SqlStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection (fixtures and ad-hoc queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Platform tables. Timestamps are epoch milliseconds; `DeleteAt = 0` means live.
/// Reactions reach their channel only through `Posts`.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Channels (
    Id TEXT PRIMARY KEY,
    Name TEXT NOT NULL,
    DisplayName TEXT NOT NULL DEFAULT '',
    Type TEXT NOT NULL,
    CreateAt INTEGER NOT NULL,
    UpdateAt INTEGER NOT NULL,
    DeleteAt INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_channels_name ON Channels(Name);

CREATE TABLE IF NOT EXISTS Posts (
    Id TEXT PRIMARY KEY,
    ChannelId TEXT NOT NULL,
    UserId TEXT NOT NULL,
    Message TEXT NOT NULL DEFAULT '',
    FileIds TEXT NOT NULL DEFAULT '',
    CreateAt INTEGER NOT NULL,
    UpdateAt INTEGER NOT NULL,
    DeleteAt INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_posts_channel ON Posts(ChannelId);

CREATE TABLE IF NOT EXISTS Reactions (
    UserId TEXT NOT NULL,
    PostId TEXT NOT NULL,
    EmojiName TEXT NOT NULL,
    CreateAt INTEGER NOT NULL,
    UpdateAt INTEGER NOT NULL,
    DeleteAt INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (UserId, PostId, EmojiName)
);
CREATE INDEX IF NOT EXISTS idx_reactions_post ON Reactions(PostId);

CREATE TABLE IF NOT EXISTS FileInfo (
    Id TEXT PRIMARY KEY,
    ChannelId TEXT NOT NULL,
    Name TEXT NOT NULL,
    Size INTEGER NOT NULL,
    Content BLOB NOT NULL,
    CreateAt INTEGER NOT NULL
);
"#;
