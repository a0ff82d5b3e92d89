//! Configuration loader and validator for the RSS feed service.
//!
//! Only static process settings live here. Values operators tune at runtime
//! (`rss_max_items`, `rss_port`) come from [`crate::params`] instead.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub feed: Feed,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    #[serde(default = "default_retention_interval_secs")]
    pub retention_interval_secs: u64,
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
}

/// Channel-level metadata of the rendered feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub language: String,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            title: "Vinted Notifications".into(),
            description: "Latest items from Vinted matching your search queries".into(),
            language: "en".into(),
        }
    }
}

fn default_error_backoff_ms() -> u64 {
    1000
}

fn default_retention_interval_secs() -> u64 {
    3600
}

fn default_bind_host() -> String {
    "0.0.0.0".into()
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        fs::create_dir_all(&self.app.data_dir)
    }

    /// `DATABASE_URL` wins over `app.database_url`, which wins over the
    /// data-dir default.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.app.database_url.clone())
            .unwrap_or_else(|| {
                format!(
                    "sqlite://{}/rss_feed.db",
                    self.app.data_dir.trim_end_matches('/')
                )
            })
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if let Some(url) = &cfg.app.database_url {
        if url.trim().is_empty() {
            return Err(ConfigError::Invalid("app.database_url must be non-empty when set"));
        }
    }
    if cfg.app.error_backoff_ms == 0 {
        return Err(ConfigError::Invalid("app.error_backoff_ms must be > 0"));
    }
    if cfg.app.retention_interval_secs == 0 {
        return Err(ConfigError::Invalid("app.retention_interval_secs must be > 0"));
    }
    if cfg.app.bind_host.trim().is_empty() {
        return Err(ConfigError::Invalid("app.bind_host must be non-empty"));
    }

    if cfg.feed.title.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.title must be non-empty"));
    }
    if cfg.feed.description.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.description must be non-empty"));
    }
    if cfg.feed.language.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.language must be non-empty"));
    }

    Ok(())
}

/// Returns an example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  error_backoff_ms: 1000
  retention_interval_secs: 3600
  bind_host: "0.0.0.0"

feed:
  title: "Vinted Notifications"
  description: "Latest items from Vinted matching your search queries"
  language: "en"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.retention_interval_secs, 3600);
        assert_eq!(cfg.feed, Feed::default());
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg: Config = serde_yaml::from_str("app:\n  data_dir: \"./d\"\n").unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.app.error_backoff_ms, 1000);
        assert_eq!(cfg.app.bind_host, "0.0.0.0");
        assert_eq!(cfg.feed.language, "en");
        assert!(cfg.app.database_url.is_none());
    }

    #[test]
    fn invalid_data_dir() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = "  ".into();
        let err = validate(&cfg).unwrap_err();
        match err { ConfigError::Invalid(msg) => assert!(msg.contains("data_dir")), _ => panic!("wrong error") }
    }

    #[test]
    fn invalid_intervals() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.retention_interval_secs = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.error_backoff_ms = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_feed_metadata() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.feed.title = "".into();
        let err = validate(&cfg).unwrap_err();
        match err { ConfigError::Invalid(msg) => assert!(msg.contains("feed.title")), _ => panic!("wrong error") }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.feed.language = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_database_url_is_used() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.database_url = Some("sqlite://elsewhere.db".into());
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(cfg.database_url(), "sqlite://elsewhere.db");
        }
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.app.data_dir, "./data");
    }
}
