use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    frequency::Frequency,
    transaction::{FlowType, LegacyRecurrence, Transaction},
};

/// Definition of a repeating income or expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub amount: f64,
    pub flow: FlowType,
    pub category_id: Option<Uuid>,
    pub account_id: Uuid,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    /// Repeat every `interval` units of `frequency`; always at least 1 once validated.
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "RecurringTemplate::default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecurringTemplate {
    pub fn new(
        account_id: Uuid,
        amount: f64,
        flow: FlowType,
        start_date: NaiveDate,
        frequency: Frequency,
        interval: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            flow,
            category_id: None,
            account_id,
            start_date,
            frequency,
            interval,
            end_date: None,
            active: true,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Builds a template from a transaction carrying a legacy repeat flag.
    pub fn from_legacy(transaction: &Transaction) -> Option<Self> {
        let frequency = match transaction.legacy_recurrence {
            LegacyRecurrence::None => return None,
            LegacyRecurrence::Daily => Frequency::Daily,
            LegacyRecurrence::Weekly => Frequency::Weekly,
            LegacyRecurrence::Monthly => Frequency::Monthly,
            LegacyRecurrence::Yearly => Frequency::Yearly,
        };
        if transaction.flow == FlowType::Transfer {
            return None;
        }
        let mut template = Self::new(
            transaction.account_id,
            transaction.amount,
            transaction.flow,
            transaction.date,
            frequency,
            1,
        );
        template.category_id = transaction.category_id;
        template.note = transaction.notes.clone();
        Some(template)
    }

    /// Projects the template onto `date` without any override applied.
    pub fn project(&self, date: NaiveDate) -> Occurrence {
        Occurrence {
            template_id: self.id,
            slot_date: date,
            date,
            amount: self.amount,
            flow: self.flow,
            category_id: self.category_id,
            account_id: self.account_id,
            state: OccurrenceState::Projected,
        }
    }

    fn default_active() -> bool {
        true
    }
}

/// One dated instance of a recurring template.
///
/// `slot_date` is the schedule date the instance occupies; `date` is where it is
/// booked and only differs for individually modified occurrences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    pub template_id: Uuid,
    pub slot_date: NaiveDate,
    pub date: NaiveDate,
    pub amount: f64,
    pub flow: FlowType,
    pub category_id: Option<Uuid>,
    pub account_id: Uuid,
    pub state: OccurrenceState,
}

impl Occurrence {
    pub fn is_deleted(&self) -> bool {
        self.state == OccurrenceState::Deleted
    }

    pub fn is_modified(&self) -> bool {
        self.state == OccurrenceState::Modified
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceState {
    /// Synthesized from the template, never stored.
    Projected,
    /// Stored with amount, date or category diverging from the template.
    Modified,
    /// Soft-deleted; kept for audit and hidden from expansion.
    Deleted,
}
