//! Persistent user preferences and their on-disk management.

pub mod manager;

use std::{io, path::PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{currency::CurrencyCode, utils::app_data_dir};

pub use manager::ConfigManager;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// User-configurable preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    #[serde(default)]
    pub base_currency: CurrencyCode,
    #[serde(default = "Config::default_notifications_enabled")]
    pub notifications_enabled: bool,
    #[serde(default = "Config::default_rate_cache_ttl_minutes")]
    pub rate_cache_ttl_minutes: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root for ledgers, backups and the alert log.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            base_currency: CurrencyCode::default(),
            notifications_enabled: Self::default_notifications_enabled(),
            rate_cache_ttl_minutes: Self::default_rate_cache_ttl_minutes(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_notifications_enabled() -> bool {
        true
    }

    pub fn default_rate_cache_ttl_minutes() -> u32 {
        60
    }

    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::minutes(i64::from(self.rate_cache_ttl_minutes))
    }

    /// Configured data directory, falling back to `POCKET_LEDGER_HOME` or
    /// `~/.pocket_ledger`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_data_dir)
    }
}
