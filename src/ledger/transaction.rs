use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of money for a transaction or template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Income,
    Expense,
    Transfer,
}

/// A one-off ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Destination account for transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    pub amount: f64,
    pub flow: FlowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Per-transaction repeat flag from older data files. Converted into a
    /// [`RecurringTemplate`](super::RecurringTemplate) by
    /// [`Ledger::migrate_legacy_recurrences`](super::Ledger::migrate_legacy_recurrences).
    #[serde(default, skip_serializing_if = "LegacyRecurrence::is_none")]
    pub legacy_recurrence: LegacyRecurrence,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        category_id: Option<Uuid>,
        date: NaiveDate,
        amount: f64,
        flow: FlowType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            to_account: None,
            category_id,
            date,
            amount,
            flow,
            notes: None,
            legacy_recurrence: LegacyRecurrence::None,
        }
    }

    pub fn transfer(from: Uuid, to: Uuid, date: NaiveDate, amount: f64) -> Self {
        Self {
            to_account: Some(to),
            ..Self::new(from, None, date, amount, FlowType::Transfer)
        }
    }

    pub fn is_expense(&self) -> bool {
        self.flow == FlowType::Expense
    }

    /// Whether the entry moves money in or out of `account_id`.
    pub fn touches_account(&self, account_id: Uuid) -> bool {
        self.account_id == account_id || self.to_account == Some(account_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LegacyRecurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl LegacyRecurrence {
    pub fn is_none(&self) -> bool {
        matches!(self, LegacyRecurrence::None)
    }
}
