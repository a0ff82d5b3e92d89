#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use vinted_rss::db;
use vinted_rss::store::ItemStore;

/// File-backed store so concurrent connections share one database.
pub async fn setup_store() -> (TempDir, ItemStore) {
    let td = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", td.path().join("feed.db").display());
    let pool = db::init_pool(&url).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    (td, ItemStore::new(pool))
}

pub fn minute(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(n)
}
