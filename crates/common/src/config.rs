//! Layered tracker configuration
//!
//! Resolution order, later wins: built-in defaults, `config.toml` in the
//! tracker home, `RTRACK_*` environment variables, then command line flags
//! (applied by the binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HOME_ENV: &str = "RTRACK_HOME";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DB_FILE: &str = "tracker.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Defaults to `tracker.db` inside the tracker home
    pub path: Option<PathBuf>,
    pub pool_size: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Identity of the signed-in user, if any
    pub user: Option<String>,
    /// Role granted on first sign-in
    pub default_role: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            user: None,
            default_role: "student".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Database file, falling back to `home/tracker.db`
    pub fn database_path(&self, home: &Path) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| home.join(DEFAULT_DB_FILE))
    }
}

/// Tracker home: `$RTRACK_HOME`, else `~/.rtrack`
pub fn tracker_home() -> PathBuf {
    if let Ok(custom) = env::var(HOME_ENV) {
        if !custom.trim().is_empty() {
            return PathBuf::from(custom);
        }
    }
    let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push(".rtrack");
    dir
}

pub struct ConfigLoader {
    home: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::with_home(tracker_home())
    }

    pub fn with_home(home: PathBuf) -> Self {
        Self {
            home,
            env_prefix: "RTRACK_".to_string(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    /// Defaults, then the config file, then the process environment
    pub async fn load(&self) -> Result<TrackerConfig> {
        let config = self.load_file().await?;
        self.apply_env_overrides(config, |key| env::var(key).ok())
    }

    /// Defaults overlaid with `config.toml`; a missing file is not an error
    pub async fn load_file(&self) -> Result<TrackerConfig> {
        let path = self.config_path();
        if !path.exists() {
            debug!("no config file at {}", path.display());
            return Ok(TrackerConfig::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config {}", path.display()))?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `RTRACK_DB`, `RTRACK_POOL_SIZE`, `RTRACK_LOG`, `RTRACK_LOG_JSON`
    /// and `RTRACK_USER` as returned by `lookup`
    pub fn apply_env_overrides<F>(&self, mut config: TrackerConfig, lookup: F) -> Result<TrackerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", self.env_prefix, name));

        if let Some(path) = var("DB") {
            config.database.path = Some(PathBuf::from(path));
        }

        if let Some(size) = var("POOL_SIZE") {
            config.database.pool_size = size
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}POOL_SIZE: {size}", self.env_prefix))?;
        }

        if let Some(level) = var("LOG") {
            config.logging.level = level;
        }

        if let Some(json) = var("LOG_JSON") {
            config.logging.json = parse_flag(&json);
        }

        if let Some(user) = var("USER") {
            config.auth.user = Some(user).filter(|u| !u.trim().is_empty());
        }

        Ok(config)
    }

    /// Write `config` as TOML, creating the home directory if needed
    pub async fn save(&self, config: &TrackerConfig) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.home)
            .await
            .with_context(|| format!("Failed to create {}", self.home.display()))?;
        let path = self.config_path();
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
