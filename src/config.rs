use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::{FilterCriteria, FilterMode, NO_LIMIT};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Default inclusion filter for commands that do not pass one.
#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_mode")]
    pub mode: FilterMode,
    #[serde(default = "default_limit_start")]
    pub limit_start: i64,
    #[serde(default)]
    pub limit_end: Option<i64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            limit_start: default_limit_start(),
            limit_end: None,
        }
    }
}

fn default_mode() -> FilterMode {
    FilterMode::Records
}
fn default_limit_start() -> i64 {
    5
}

impl FilterConfig {
    /// Replaces the configured values with any given on the command line.
    pub fn with_overrides(
        &self,
        mode: Option<FilterMode>,
        limit_start: Option<i64>,
        limit_end: Option<i64>,
    ) -> Self {
        Self {
            mode: mode.unwrap_or(self.mode),
            limit_start: limit_start.unwrap_or(self.limit_start),
            limit_end: limit_end.or(self.limit_end),
        }
    }

    /// Validated inclusion filter.
    pub fn criteria(&self) -> Result<FilterCriteria> {
        if self.limit_start < NO_LIMIT {
            anyhow::bail!("filter limit_start must be >= -1 (-1 disables filtering)");
        }
        if let Some(end) = self.limit_end {
            if self.limit_start != NO_LIMIT && end < self.limit_start {
                anyhow::bail!(
                    "filter limit_end ({}) must be >= limit_start ({})",
                    end,
                    self.limit_start
                );
            }
        }
        Ok(FilterCriteria::new(self.mode, self.limit_start, self.limit_end))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.cache.ttl_secs == 0 {
        anyhow::bail!("cache.ttl_secs must be > 0");
    }
    config.filter.criteria().context("Invalid [filter] section")?;

    Ok(config)
}
