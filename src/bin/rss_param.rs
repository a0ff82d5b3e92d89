use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use vinted_rss::config;
use vinted_rss::db;
use vinted_rss::params::{self, SqliteParameters};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Inspect or change live feed parameters (rss_max_items, rss_port)"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one parameter
    Get { key: String },
    /// Store a parameter; running services pick it up on their next read
    Set { key: String, value: String },
    /// Print every stored parameter and the effective feed settings
    List,
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

    match args.command {
        Command::Get { key } => {
            let value = db::params::get_parameter(&pool, &key)
                .await?
                .with_context(|| format!("parameter {key} is not set"))?;
            println!("{value}");
        }
        Command::Set { key, value } => {
            db::params::set_parameter(&pool, &key, &value).await?;
            info!(%key, %value, "parameter stored");
        }
        Command::List => {
            for (key, value) in db::params::list_parameters(&pool).await? {
                println!("{key}={value}");
            }
            let source = SqliteParameters::new(pool.clone());
            println!(
                "# effective: {}={} {}={}",
                params::MAX_ITEMS_KEY,
                params::display_ceiling(&source).await,
                params::PORT_KEY,
                params::listen_port(&source).await
            );
        }
    }

    Ok(())
}
