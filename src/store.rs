use crate::db::{self, Pool};
use crate::model::Item;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

/// Deduplicated, bounded store of feed items.
///
/// Storage errors never escape: each operation logs and returns a safe
/// default. Deduplication relies solely on the unique `url` column.
#[derive(Clone)]
pub struct ItemStore {
    pool: Pool,
}

impl ItemStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Returns `true` when a new row was created, `false` for a duplicate
    /// `url` or any failure.
    pub async fn add(
        &self,
        title: &str,
        content: &str,
        url: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> bool {
        match self.try_add(title, content, url, published_at).await {
            Ok(inserted) => inserted,
            Err(err) => {
                error!(?err, url, "failed to add rss item");
                false
            }
        }
    }

    /// Like [`ItemStore::add`] but surfaces storage errors to the caller.
    pub async fn try_add(
        &self,
        title: &str,
        content: &str,
        url: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let published_at = published_at.unwrap_or_else(Utc::now);
        let inserted = db::insert_item(&self.pool, title, content, url, published_at).await?;
        if inserted {
            debug!(title, url, "added rss item");
        } else {
            debug!(url, "rss item already exists");
        }
        Ok(inserted)
    }

    /// Most recent first, at most `limit` entries.
    pub async fn list(&self, limit: i64) -> Vec<Item> {
        db::list_items(&self.pool, limit).await.unwrap_or_else(|err| {
            error!(?err, limit, "failed to list rss items");
            Vec::new()
        })
    }

    pub async fn count(&self) -> i64 {
        db::count_items(&self.pool).await.unwrap_or_else(|err| {
            error!(?err, "failed to count rss items");
            0
        })
    }

    /// Evicts the oldest items until at most `max_count` remain.
    /// Best-effort: failures are logged and reported as zero deletions.
    pub async fn trim(&self, max_count: i64) -> u64 {
        match db::delete_oldest_beyond(&self.pool, max_count).await {
            Ok(0) => 0,
            Ok(deleted) => {
                info!(deleted, max_count, "cleaned up old rss items");
                deleted
            }
            Err(err) => {
                error!(?err, max_count, "failed to clean up rss items");
                0
            }
        }
    }
}
