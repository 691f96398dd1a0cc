//! Ledger domain models, persistence-friendly types, and helpers.

pub mod account;
pub mod budget;
pub mod category;
pub mod frequency;
pub mod goal;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod period;
pub mod recurring;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use budget::{Budget, BudgetScope};
pub use category::{default_categories, Category, CategoryKind};
pub use frequency::Frequency;
pub use goal::SavingsGoal;
pub use ledger::Ledger;
pub use period::PeriodKey;
pub use recurring::{Occurrence, OccurrenceState, RecurringTemplate};
pub use transaction::{FlowType, LegacyRecurrence, Transaction};
