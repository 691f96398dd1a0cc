use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use super::{LedgerStore, Result};
use crate::{
    errors::LedgerError,
    ledger::Ledger,
    utils::persistence::{load_ledger_from_file, save_ledger_to_file},
};

const LEDGER_EXTENSION: &str = "json";
const LEDGERS_DIR: &str = "ledgers";
const BACKUPS_DIR: &str = "backups";
const DEFAULT_RETENTION: usize = 5;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
///
/// Every save of an existing ledger first copies the previous file into the
/// ledger's backup folder; only the newest `retention` backups are kept.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: &Path) -> Result<Self> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: &Path, retention: usize) -> Result<Self> {
        let ledgers_dir = root.join(LEDGERS_DIR);
        let backups_dir = root.join(BACKUPS_DIR);
        fs::create_dir_all(&ledgers_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            ledgers_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    pub fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<()> {
        let path = self.ledger_path(name);
        if path.exists() {
            self.backup_file(name, &path)?;
        }
        save_ledger_to_file(ledger, &path)?;
        tracing::info!(ledger = %canonical_name(name), "ledger saved");
        Ok(())
    }

    pub fn load_ledger(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(LedgerError::NotFound(format!("ledger `{}`", name)));
        }
        load_ledger_from_file(&path)
    }

    pub fn list_ledgers(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete_ledger(&self, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        if path.exists() {
            fs::remove_file(path)?;
            tracing::info!(ledger = %canonical_name(name), "ledger deleted");
        }
        Ok(())
    }

    /// Copies the current ledger file into the backup folder.
    pub fn backup_ledger(&self, name: &str) -> Result<BackupInfo> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(LedgerError::NotFound(format!("ledger `{}`", name)));
        }
        self.backup_file(name, &path)
    }

    /// Lists backups of `name`, newest first.
    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    ledger: slug.clone(),
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    /// Replaces the ledger file with the given backup and returns its contents.
    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<Ledger> {
        if !backup.path.exists() {
            return Err(LedgerError::NotFound(format!("backup `{}`", backup.id)));
        }
        let ledger = load_ledger_from_file(&backup.path)?;
        save_ledger_to_file(&ledger, &self.ledger_path(&backup.ledger))?;
        tracing::info!(ledger = %backup.ledger, backup = %backup.id, "ledger restored");
        Ok(ledger)
    }

    fn backup_file(&self, name: &str, path: &Path) -> Result<BackupInfo> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let slug = canonical_name(name);
        let latest = self
            .list_backups(name)?
            .first()
            .and_then(|info| info.created_at)
            .map(|stamp| stamp.timestamp_millis());
        let mut millis = Utc::now().timestamp_millis();
        if let Some(latest) = latest {
            millis = millis.max(latest + 1);
        }
        let id = backup_file_name(&slug, millis);
        let target = dir.join(&id);
        fs::copy(path, &target)?;
        self.prune_backups(name)?;
        Ok(BackupInfo {
            ledger: slug,
            created_at: parse_backup_timestamp(&id),
            id,
            path: target,
        })
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        for entry in self.list_backups(name)?.into_iter().skip(self.retention) {
            fs::remove_file(&entry.path)?;
        }
        Ok(())
    }

    /// Handle that reads and writes one named ledger.
    pub fn open(&self, name: &str) -> JsonLedgerStore {
        JsonLedgerStore {
            storage: self.clone(),
            name: canonical_name(name),
        }
    }
}

/// [`LedgerStore`] over one ledger file of a [`JsonStorage`].
///
/// Loading a ledger that was never saved yields a fresh empty ledger.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    storage: JsonStorage,
    name: String,
}

impl JsonLedgerStore {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<Ledger> {
        match self.storage.load_ledger(&self.name) {
            Err(LedgerError::NotFound(_)) => Ok(Ledger::new(self.name.clone())),
            other => other,
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        self.storage.save_ledger(&self.name, ledger)
    }
}

fn backup_file_name(slug: &str, millis: i64) -> String {
    format!("{}_{}.{}", slug, millis, LEDGER_EXTENSION)
}

fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{}", LEDGER_EXTENSION))?;
    let (_, millis) = stem.rsplit_once('_')?;
    DateTime::from_timestamp_millis(millis.parse().ok()?)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn canonical_names_are_file_safe() {
        assert_eq!(canonical_name("My Budget"), "my_budget");
        assert_eq!(canonical_name("  "), "ledger");
        assert_eq!(canonical_name("home-2024"), "home-2024");
    }

    #[test]
    fn backups_are_pruned_to_retention() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::with_retention(dir.path(), 2).unwrap();
        let ledger = Ledger::new("Household");
        for _ in 0..5 {
            storage.save_ledger("household", &ledger).unwrap();
        }
        let backups = storage.list_backups("household").unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].created_at > backups[1].created_at);
    }

    #[test]
    fn missing_ledger_reports_not_found() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.load_ledger("nope"),
            Err(LedgerError::NotFound(_))
        ));
        let store = storage.open("nope");
        assert!(store.load().unwrap().templates.is_empty());
    }
}
