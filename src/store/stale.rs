//! Staleness query: channels whose own, post, and reaction activity all predate the cutoff.
//!
//! Activity is aggregated per channel before comparing (`MAX` of each row's latest update or
//! delete marker). Filtering rows across a plain join would keep a channel as soon as any single
//! old post or reaction row matched, even when newer ones exist.
//!
//! Paging is offset-based over `ch.Id ASC` and fetches `page_size + 1` rows; the extra row only
//! signals that another page exists and is never returned.

use anyhow::{Context, Result, anyhow};
use log::debug;
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::types::{ChannelRef, PageRequest, PageResult, StaleChannelCriteria};

use super::SqlStore;

const STALE_SELECT: &str = r#"
SELECT ch.Id, ch.Name
FROM Channels AS ch
LEFT JOIN (
    SELECT ChannelId, MAX(MAX(UpdateAt, DeleteAt)) AS LastActivity
    FROM Posts
    GROUP BY ChannelId
) AS pa ON pa.ChannelId = ch.Id
LEFT JOIN (
    SELECT p.ChannelId AS ChannelId, MAX(MAX(r.UpdateAt, r.DeleteAt)) AS LastActivity
    FROM Reactions AS r
    INNER JOIN Posts AS p ON p.Id = r.PostId
    GROUP BY p.ChannelId
) AS ra ON ra.ChannelId = ch.Id
WHERE ch.DeleteAt = 0
  AND ch.UpdateAt < ?
  AND (pa.LastActivity IS NULL OR pa.LastActivity < ?)
  AND (ra.LastActivity IS NULL OR ra.LastActivity < ?)"#;

/// SQL text plus positional parameters, in order.
#[derive(Debug)]
pub struct StaleQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// `count` comma-separated `?` placeholders.
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Build the staleness query for `criteria` at reference time `now_ms`.
/// Returns `None` when no channel type is included (nothing can match). Fails when the page
/// offset does not fit a SQLite integer.
pub fn build_stale_query(
    criteria: &StaleChannelCriteria,
    page: PageRequest,
    now_ms: i64,
) -> Result<Option<StaleQuery>> {
    if criteria.include_types.is_empty() {
        return Ok(None);
    }
    let cutoff = criteria.cutoff_ms(now_ms);
    let mut sql = String::from(STALE_SELECT);
    let mut params: Vec<Value> = vec![
        Value::Integer(cutoff),
        Value::Integer(cutoff),
        Value::Integer(cutoff),
    ];

    sql.push_str(&format!(
        "\n  AND ch.Type IN ({})",
        placeholders(criteria.include_types.len())
    ));
    params.extend(
        criteria
            .include_types
            .iter()
            .map(|t| Value::Text(t.as_db_str().to_string())),
    );

    // Never empty: reserved names are always present.
    let excludes = criteria.effective_excludes();
    let marks = placeholders(excludes.len());
    sql.push_str(&format!(
        "\n  AND ch.Id NOT IN ({marks})\n  AND ch.Name NOT IN ({marks})"
    ));
    for _ in 0..2 {
        params.extend(excludes.iter().map(|e| Value::Text(e.clone())));
    }

    sql.push_str("\nORDER BY ch.Id");

    if page.page_size > 0 {
        let offset = page
            .page
            .checked_mul(page.page_size)
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| {
                anyhow!(
                    "page {} of size {} is out of range",
                    page.page,
                    page.page_size
                )
            })?;
        // A size past i64 cannot be exceeded; SQLite reads a negative LIMIT as no limit.
        let limit = i64::try_from(page.page_size)
            .ok()
            .and_then(|n| n.checked_add(1))
            .unwrap_or(-1);
        sql.push_str("\nLIMIT ? OFFSET ?");
        params.push(Value::Integer(limit));
        params.push(Value::Integer(offset));
    }

    Ok(Some(StaleQuery { sql, params }))
}

impl SqlStore {
    /// Staleness query evaluated against an explicit reference time.
    pub fn fetch_stale_channels_at(
        &self,
        criteria: &StaleChannelCriteria,
        page: PageRequest,
        now_ms: i64,
    ) -> Result<PageResult> {
        let Some(query) = build_stale_query(criteria, page, now_ms)? else {
            debug!("No channel types included; nothing to fetch");
            return Ok(PageResult::default());
        };

        let mut stmt = self
            .conn()
            .prepare(&query.sql)
            .context("prepare stale channel query")?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                Ok(ChannelRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .context("run stale channel query")?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.context("scan stale channel row")?);
        }

        let has_more = page.page_size > 0 && items.len() > page.page_size;
        if has_more {
            items.truncate(page.page_size);
        }
        debug!(
            "Stale page {} (size {}): {} channels, more={}",
            page.page,
            page.page_size,
            items.len(),
            has_more
        );
        Ok(PageResult { items, has_more })
    }
}
