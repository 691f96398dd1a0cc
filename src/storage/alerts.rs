use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::RwLock,
};

use uuid::Uuid;

use super::Result;
use crate::{
    core::evaluator::AlertKey,
    errors::LedgerError,
    ledger::PeriodKey,
    utils::persistence::{load_json, save_json},
};

/// Remembers which budgets were already alerted in which period.
pub trait AlertLog: Send + Sync {
    fn has_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<bool>;
    fn mark_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<()>;
    /// Forgets every alert of `period`, returning how many were cleared.
    fn clear_period(&self, period: PeriodKey) -> Result<usize>;

    /// Subset of `budget_ids` already alerted for `period`.
    fn alerted_keys(&self, budget_ids: &[Uuid], period: PeriodKey) -> Result<HashSet<AlertKey>> {
        let mut keys = HashSet::new();
        for budget_id in budget_ids {
            if self.has_alerted(*budget_id, period)? {
                keys.insert(AlertKey::new(*budget_id, period));
            }
        }
        Ok(keys)
    }
}

#[derive(Debug, Default)]
pub struct MemoryAlertLog {
    keys: RwLock<HashSet<AlertKey>>,
}

impl MemoryAlertLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertLog for MemoryAlertLog {
    fn has_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<bool> {
        let keys = self.keys.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(keys.contains(&AlertKey::new(budget_id, period)))
    }

    fn mark_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<()> {
        let mut keys = self.keys.write().map_err(|_| LedgerError::Poisoned)?;
        keys.insert(AlertKey::new(budget_id, period));
        Ok(())
    }

    fn clear_period(&self, period: PeriodKey) -> Result<usize> {
        let mut keys = self.keys.write().map_err(|_| LedgerError::Poisoned)?;
        let before = keys.len();
        keys.retain(|key| key.period != period);
        Ok(before - keys.len())
    }
}

/// Alert log persisted as a JSON array next to the ledger files.
#[derive(Debug)]
pub struct JsonAlertLog {
    path: PathBuf,
    keys: RwLock<HashSet<AlertKey>>,
}

impl JsonAlertLog {
    pub fn open(path: &Path) -> Result<Self> {
        let keys = if path.exists() {
            let stored: Vec<AlertKey> = load_json(path)?;
            stored.into_iter().collect()
        } else {
            HashSet::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            keys: RwLock::new(keys),
        })
    }

    fn persist(&self, keys: &HashSet<AlertKey>) -> Result<()> {
        let mut sorted: Vec<&AlertKey> = keys.iter().collect();
        sorted.sort_by_key(|key| (key.period, key.budget_id));
        save_json(&sorted, &self.path)
    }
}

impl AlertLog for JsonAlertLog {
    fn has_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<bool> {
        let keys = self.keys.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(keys.contains(&AlertKey::new(budget_id, period)))
    }

    fn mark_alerted(&self, budget_id: Uuid, period: PeriodKey) -> Result<()> {
        let mut keys = self.keys.write().map_err(|_| LedgerError::Poisoned)?;
        let key = AlertKey::new(budget_id, period);
        if keys.contains(&key) {
            return Ok(());
        }
        let mut updated = keys.clone();
        updated.insert(key);
        self.persist(&updated)?;
        *keys = updated;
        Ok(())
    }

    fn clear_period(&self, period: PeriodKey) -> Result<usize> {
        let mut keys = self.keys.write().map_err(|_| LedgerError::Poisoned)?;
        let mut updated = keys.clone();
        updated.retain(|key| key.period != period);
        let cleared = keys.len() - updated.len();
        if cleared > 0 {
            self.persist(&updated)?;
            *keys = updated;
        }
        Ok(cleared)
    }
}
