//! Live runtime parameters.
//!
//! Values are read from the source on every call; nothing is cached, so an
//! operator changing `rss_max_items` takes effect on the next render or trim.
use crate::db::{self, Pool};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

pub const MAX_ITEMS_KEY: &str = "rss_max_items";
pub const PORT_KEY: &str = "rss_port";
pub const DEFAULT_MAX_ITEMS: i64 = 100;
pub const DEFAULT_PORT: u16 = 8001;

#[async_trait]
pub trait ParameterSource: Send + Sync {
    async fn get_parameter(&self, key: &str) -> Result<Option<String>>;
}

/// Parameters stored in the `parameters` table of the feed database.
#[derive(Clone)]
pub struct SqliteParameters {
    pool: Pool,
}

impl SqliteParameters {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParameterSource for SqliteParameters {
    async fn get_parameter(&self, key: &str) -> Result<Option<String>> {
        db::params::get_parameter(&self.pool, key).await
    }
}

/// In-memory source, handy for embedding and tests.
#[derive(Clone, Default)]
pub struct StaticParameters {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl StaticParameters {
    pub fn set(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut guard) = self.values.write() {
            guard.insert(key.to_string(), value.into());
        }
    }
}

#[async_trait]
impl ParameterSource for StaticParameters {
    async fn get_parameter(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .values
            .read()
            .map_err(|_| anyhow::anyhow!("parameter map poisoned"))?;
        Ok(guard.get(key).cloned())
    }
}

/// Display ceiling for the feed. Missing, unreadable or non-positive values
/// yield [`DEFAULT_MAX_ITEMS`].
pub async fn display_ceiling(source: &dyn ParameterSource) -> i64 {
    read_or_default(source, MAX_ITEMS_KEY, DEFAULT_MAX_ITEMS, |v| {
        v.parse::<i64>().ok().filter(|n| *n > 0)
    })
    .await
}

pub async fn listen_port(source: &dyn ParameterSource) -> u16 {
    read_or_default(source, PORT_KEY, DEFAULT_PORT, |v| v.parse::<u16>().ok()).await
}

async fn read_or_default<T, F>(source: &dyn ParameterSource, key: &str, default: T, parse: F) -> T
where
    F: Fn(&str) -> Option<T>,
{
    match source.get_parameter(key).await {
        Ok(Some(raw)) => parse(raw.trim()).unwrap_or_else(|| {
            warn!(key, value = %raw, "unparseable parameter; using default");
            default
        }),
        Ok(None) => default,
        Err(err) => {
            warn!(?err, key, "failed to read parameter; using default");
            default
        }
    }
}
