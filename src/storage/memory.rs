use std::sync::RwLock;

use super::{LedgerStore, Result};
use crate::{errors::LedgerError, ledger::Ledger};

/// Keeps the ledger in process memory.
#[derive(Debug)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
}

impl MemoryStore {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Ledger> {
        self.ledger
            .read()
            .map(|ledger| ledger.clone())
            .map_err(|_| LedgerError::Poisoned)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut guard = self.ledger.write().map_err(|_| LedgerError::Poisoned)?;
        *guard = ledger.clone();
        Ok(())
    }
}
