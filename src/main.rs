use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{error, info};

use vinted_rss::params::{self, ParameterSource, SqliteParameters};
use vinted_rss::server::{create_router, AppState};
use vinted_rss::store::ItemStore;
use vinted_rss::{config, consumer, db, ingest, retention};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Capacity of the in-process notification queue
    #[arg(long, default_value = "1024")]
    queue_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;
    info!("rss database initialized");

    let store = ItemStore::new(pool.clone());
    let parameters: Arc<dyn ParameterSource> = Arc::new(SqliteParameters::new(pool));

    let (tx, rx) = consumer::channel(args.queue_capacity.max(1));
    // Keeps the queue open after stdin ends; the consumer lives as long as the process.
    let _queue_guard = tx.clone();
    tokio::spawn(consumer::run(
        store.clone(),
        rx,
        Duration::from_millis(cfg.app.error_backoff_ms),
    ));
    tokio::spawn(retention::run(
        store.clone(),
        parameters.clone(),
        Duration::from_secs(cfg.app.retention_interval_secs),
    ));
    // The watcher pipes its notifications in as JSON lines.
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(err) = ingest::forward_lines(stdin, tx).await {
            error!(?err, "notification input failed");
        }
    });

    let port = params::listen_port(parameters.as_ref()).await;
    let addr = format!("{}:{}", cfg.app.bind_host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let state = AppState {
        store,
        params: parameters,
        feed: Arc::new(cfg.feed.clone()),
    };

    info!(%addr, "serving rss feed");
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
