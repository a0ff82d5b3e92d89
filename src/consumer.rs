use crate::model::Notification;
use crate::store::ItemStore;
use crate::title::extract_title;
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{error, info, instrument, warn};

/// Queue feeding the consumer. Producers hold the sender half.
pub fn channel(capacity: usize) -> (mpsc::Sender<Notification>, mpsc::Receiver<Notification>) {
    mpsc::channel(capacity)
}

/// Stores one notification; returns whether it was new.
pub async fn ingest(store: &ItemStore, notification: &Notification) -> Result<bool> {
    let title = extract_title(&notification.content);
    store
        .try_add(title, &notification.content, &notification.url, Some(Utc::now()))
        .await
}

/// Outcome of one drained batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub drained: usize,
    pub inserted: usize,
    pub failed: bool,
}

/// Stores `first` and then everything already waiting in the queue, without
/// blocking. The batch stops at the first storage failure; events still
/// queued are left for the next batch.
#[instrument(skip_all)]
pub async fn drain_batch(
    store: &ItemStore,
    rx: &mut mpsc::Receiver<Notification>,
    first: Notification,
) -> BatchStats {
    let mut stats = BatchStats::default();
    let mut next = Some(first);
    while let Some(notification) = next.take() {
        stats.drained += 1;
        match ingest(store, &notification).await {
            Ok(true) => stats.inserted += 1,
            Ok(false) => {}
            Err(err) => {
                error!(?err, url = %notification.url, "failed to store queued notification");
                stats.failed = true;
                break;
            }
        }
        next = match rx.try_recv() {
            Ok(n) => Some(n),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        };
    }
    stats
}

/// Runs until every sender is dropped. Blocks on the queue while idle and
/// drains bursts back to back; after a failed batch it pauses for
/// `error_backoff` before receiving again.
pub async fn run(store: ItemStore, mut rx: mpsc::Receiver<Notification>, error_backoff: Duration) {
    info!("rss queue consumer started");
    while let Some(first) = rx.recv().await {
        let stats = drain_batch(&store, &mut rx, first).await;
        if stats.failed {
            warn!(
                drained = stats.drained,
                inserted = stats.inserted,
                "rss batch aborted; backing off"
            );
            tokio::time::sleep(error_backoff).await;
        }
    }
    info!("rss queue closed; consumer exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations};
    use tempfile::TempDir;

    async fn setup_store() -> (TempDir, ItemStore) {
        let td = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", td.path().join("consumer.db").display());
        let pool = init_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (td, ItemStore::new(pool))
    }

    #[tokio::test]
    async fn drains_everything_queued() {
        let (_td, store) = setup_store().await;
        let (tx, mut rx) = channel(16);
        for i in 1..4 {
            tx.send(Notification::new(format!("🆕 Title : Item {i}\n"), format!("http://{i}")))
                .await
                .unwrap();
        }
        tx.send(Notification::new("dup", "http://1")).await.unwrap();

        let first = Notification::new("🆕 Title : Item 0\n", "http://0");
        let stats = drain_batch(&store, &mut rx, first).await;
        assert_eq!(stats, BatchStats { drained: 5, inserted: 4, failed: false });
        assert!(rx.try_recv().is_err());

        let titles: Vec<String> = store.list(10).await.into_iter().map(|i| i.title).collect();
        assert!(titles.contains(&"Item 0".to_string()));
        assert!(titles.contains(&"Item 3".to_string()));
    }

    #[tokio::test]
    async fn failure_aborts_batch_and_leaves_rest_queued() {
        let (_td, store) = setup_store().await;
        let (tx, mut rx) = channel(16);
        tx.send(Notification::new("later", "http://later")).await.unwrap();

        // Empty url makes the insert fail.
        let stats = drain_batch(&store, &mut rx, Notification::new("bad", "")).await;
        assert_eq!(stats, BatchStats { drained: 1, inserted: 0, failed: true });
        assert_eq!(rx.try_recv().unwrap().url, "http://later");
    }

    #[tokio::test]
    async fn run_exits_when_producers_are_gone() {
        let (_td, store) = setup_store().await;
        let (tx, rx) = channel(4);
        let worker = tokio::spawn(run(store.clone(), rx, Duration::from_millis(10)));
        tx.send(Notification::new("🆕 Title : Boots\n", "http://boots")).await.unwrap();
        tx.send(Notification::new("broken", "")).await.unwrap();
        tx.send(Notification::new("🆕 Title : Hat\n", "http://hat")).await.unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), worker).await.unwrap().unwrap();
        assert_eq!(store.count().await, 2);
    }
}
