use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub time: TimeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String, // "text" or "json"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Row-oriented, SQLite
    Sqlite,
    /// Document-oriented, sled
    Document,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Document => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Per-call storage timeout; 0 disables it
    pub call_timeout_seconds: u64,
    pub sqlite: SqliteConfig,
    pub document: DocumentConfig,
}

impl StorageConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_seconds > 0).then(|| Duration::from_secs(self.call_timeout_seconds))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeConfig {
    /// Offset used for calendar-day and calendar-month boundaries
    pub utc_offset_minutes: i32,
}

impl TimeConfig {
    pub fn day_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!("Invalid UTC offset: {} minutes", self.utc_offset_minutes)
        })
    }
}

/// Load configuration: defaults, then the optional TOML file, then
/// `ANALYTICS__SECTION__KEY` environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8089_i64)?
        .set_default("server.log_level", "info")?
        .set_default("server.log_format", "text")?
        .set_default("storage.backend", "sqlite")?
        .set_default("storage.call_timeout_seconds", 10_i64)?
        .set_default("storage.sqlite.url", "sqlite:./data/analytics.db")?
        .set_default("storage.sqlite.max_connections", 5_i64)?
        .set_default("storage.document.path", "./data/analytics-docs")?
        .set_default("time.utc_offset_minutes", 0_i64)?
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("ANALYTICS").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if !matches!(cfg.server.log_format.as_str(), "text" | "json") {
        anyhow::bail!(
            "Invalid log format '{}': expected 'text' or 'json'",
            cfg.server.log_format
        );
    }

    match cfg.storage.backend {
        BackendKind::Sqlite => {
            if cfg.storage.sqlite.url.trim().is_empty() {
                anyhow::bail!("storage.sqlite.url cannot be empty");
            }
            if cfg.storage.sqlite.max_connections == 0 {
                anyhow::bail!("storage.sqlite.max_connections must be at least 1");
            }
        }
        BackendKind::Document => {
            if cfg.storage.document.path.trim().is_empty() {
                anyhow::bail!("storage.document.path cannot be empty");
            }
        }
    }

    if cfg.time.utc_offset_minutes.abs() >= 24 * 60 {
        anyhow::bail!(
            "time.utc_offset_minutes must be within ±1439, got {}",
            cfg.time.utc_offset_minutes
        );
    }

    Ok(())
}
