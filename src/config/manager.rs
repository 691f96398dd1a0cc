use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use super::{Config, ConfigError};
use crate::{errors::LedgerError, utils::persistence::save_json};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "config_";

/// Handles persistence and backup management for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join("config.json"), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            read_config(&self.config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        write_config(config, &self.config_path)?;
        tracing::info!(path = %self.config_path.display(), "configuration saved");
        Ok(())
    }

    /// Writes a timestamped copy of `config`, returning the backup file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        fs::create_dir_all(&self.backups_dir)?;
        let suffix = sanitize_note(note)
            .map(|label| format!("-{}", label))
            .unwrap_or_default();
        // Timestamps stay strictly increasing so listing order is well defined.
        let latest = self
            .list_backups()?
            .first()
            .and_then(|name| parse_timestamp(name))
            .map(|stamp| stamp.timestamp_millis());
        let mut millis = Utc::now().timestamp_millis();
        if let Some(latest) = latest {
            millis = millis.max(latest + 1);
        }
        let name = backup_name(millis, &suffix);
        write_config(config, &self.backups_dir.join(&name))?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("configuration backup `{}` not found", backup_name),
            )));
        }
        let config = read_config(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by_key(|name| Reverse(parse_timestamp(name)));
        Ok(entries)
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn write_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    save_json(config, path).map_err(|err| match err {
        LedgerError::Io(io) => ConfigError::Io(io),
        other => ConfigError::Serde(other.to_string()),
    })
}

fn backup_name(millis: i64, suffix: &str) -> String {
    format!("{}{}{}.{}", BACKUP_PREFIX, millis, suffix, BACKUP_EXTENSION)
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let millis = stem.split('-').next()?;
    DateTime::from_timestamp_millis(millis.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_slugged() {
        assert_eq!(sanitize_note(Some("  Before Trip. ")), Some("before-trip".into()));
        assert_eq!(sanitize_note(Some("!!")), None);
        assert_eq!(sanitize_note(None), None);
    }

    #[test]
    fn timestamp_survives_note_suffix() {
        let name = backup_name(1_700_000_000_000, "-weekly");
        assert_eq!(
            parse_timestamp(&name),
            DateTime::from_timestamp_millis(1_700_000_000_000)
        );
        assert_eq!(parse_timestamp("other.json"), None);
    }
}
