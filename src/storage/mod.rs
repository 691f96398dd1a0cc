//! Storage collaborators: where ledgers live and which alerts were already raised.

pub mod alerts;
pub mod json_backend;
pub mod memory;

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    core::aggregation::{aggregate_spend, AccountScope, SpendSummary},
    currency::{CurrencyCode, RateProvider},
    errors::LedgerError,
    ledger::{Budget, Ledger, Occurrence, PeriodKey},
};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends holding a single ledger.
///
/// The read helpers answer from one snapshot, so every value they return is
/// consistent with the others taken from the same `load`.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;

    fn list_overrides_for_template(
        &self,
        template_id: Uuid,
    ) -> Result<HashMap<NaiveDate, Occurrence>> {
        Ok(self.load()?.overrides_for_template(template_id))
    }

    fn list_budgets_for_period(&self, period: PeriodKey) -> Result<Vec<Budget>> {
        Ok(self.load()?.budgets_for_period(period))
    }

    fn aggregate_spend(
        &self,
        period: PeriodKey,
        scope: AccountScope,
        rates: &dyn RateProvider,
        base: &CurrencyCode,
    ) -> Result<SpendSummary> {
        Ok(aggregate_spend(&self.load()?, period, scope, rates, base))
    }
}

/// Loads the ledger, applies `apply`, and saves only when it succeeds.
pub fn with_ledger_mut<T, E>(
    store: &dyn LedgerStore,
    apply: impl FnOnce(&mut Ledger) -> std::result::Result<T, E>,
) -> std::result::Result<T, E>
where
    E: From<LedgerError>,
{
    let mut ledger = store.load()?;
    let value = apply(&mut ledger)?;
    store.save(&ledger)?;
    Ok(value)
}

pub use alerts::{AlertLog, JsonAlertLog, MemoryAlertLog};
pub use json_backend::{BackupInfo, JsonLedgerStore, JsonStorage};
pub use memory::MemoryStore;
