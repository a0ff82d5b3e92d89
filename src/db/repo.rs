use super::{format_timestamp, parse_timestamp, Pool};
use crate::model::Item;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::instrument;

/// `INSERT OR IGNORE` keyed on the unique `url`. Returns whether a row was created.
#[instrument(skip_all)]
pub async fn insert_item(
    pool: &Pool,
    title: &str,
    content: &str,
    url: &str,
    published_at: DateTime<Utc>,
) -> Result<bool> {
    if url.trim().is_empty() {
        return Err(anyhow!("item url must be non-empty"));
    }
    let res = sqlx::query(
        "INSERT OR IGNORE INTO rss_items (title, content, url, published_at) VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(content)
    .bind(url)
    .bind(format_timestamp(published_at))
    .execute(pool)
    .await
    .context("failed to insert rss item")?;
    Ok(res.rows_affected() > 0)
}

#[instrument(skip_all)]
pub async fn list_items(pool: &Pool, limit: i64) -> Result<Vec<Item>> {
    let rows = sqlx::query(
        "SELECT id, title, content, url, published_at, created_at FROM rss_items \
         ORDER BY published_at DESC, id DESC LIMIT ?",
    )
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(item_from_row).collect())
}

#[instrument(skip_all)]
pub async fn count_items(pool: &Pool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rss_items")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Deletes the oldest rows beyond `max_count` in a single statement, so the
/// count and the delete see the same snapshot and no read-to-write lock
/// upgrade can fail. Returns the number of rows removed.
#[instrument(skip_all)]
pub async fn delete_oldest_beyond(pool: &Pool, max_count: i64) -> Result<u64> {
    // A negative LIMIT means "no limit" in SQLite, hence the max(0, ..).
    let res = sqlx::query(
        "DELETE FROM rss_items WHERE id IN \
         (SELECT id FROM rss_items ORDER BY published_at ASC, id ASC \
          LIMIT max(0, (SELECT COUNT(*) FROM rss_items) - ?))",
    )
    .bind(max_count.max(0))
    .execute(pool)
    .await
    .context("failed to delete old rss items")?;
    Ok(res.rows_affected())
}

fn item_from_row(row: &SqliteRow) -> Item {
    let published_raw: String = row.get("published_at");
    let created_raw: Option<String> = row.try_get("created_at").ok().flatten();
    Item {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        url: row.get("url"),
        // An unreadable timestamp must not hide the item from the feed.
        published_at: parse_timestamp(&published_raw).unwrap_or_else(Utc::now),
        created_at: created_raw.as_deref().and_then(parse_timestamp),
    }
}
