use crate::params::{display_ceiling, ParameterSource};
use crate::store::ItemStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// The store keeps this many times the display ceiling.
pub const RETENTION_FACTOR: i64 = 10;

/// One retention pass against the current display ceiling.
/// Returns the number of items evicted.
#[instrument(skip_all)]
pub async fn run_once(store: &ItemStore, params: &dyn ParameterSource) -> u64 {
    let ceiling = display_ceiling(params).await.saturating_mul(RETENTION_FACTOR);
    let deleted = store.trim(ceiling).await;
    debug!(ceiling, deleted, "retention pass finished");
    deleted
}

/// Sleeps `interval`, then trims; forever.
pub async fn run(store: ItemStore, params: Arc<dyn ParameterSource>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "rss retention scheduler started");
    loop {
        tokio::time::sleep(interval).await;
        run_once(&store, params.as_ref()).await;
    }
}
