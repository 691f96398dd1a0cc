use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    account::Account,
    budget::Budget,
    category::{default_categories, Category},
    goal::SavingsGoal,
    period::PeriodKey,
    recurring::{Occurrence, OccurrenceState, RecurringTemplate},
    transaction::{LegacyRecurrence, Transaction},
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Everything persisted for one user: accounts, categories, entries, recurring
/// templates with their stored occurrences, budgets and savings goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub templates: Vec<RecurringTemplate>,
    /// Stored occurrences (modified or soft-deleted instances of templates).
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            templates: Vec::new(),
            occurrences: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn add_template(&mut self, template: RecurringTemplate) -> Uuid {
        let id = template.id;
        self.templates.push(template);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn add_goal(&mut self, goal: SavingsGoal) -> Uuid {
        let id = goal.id;
        self.goals.push(goal);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn template(&self, id: Uuid) -> Option<&RecurringTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn template_mut(&mut self, id: Uuid) -> Option<&mut RecurringTemplate> {
        self.templates.iter_mut().find(|template| template.id == id)
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.id == id)
    }

    pub fn budget_mut(&mut self, id: Uuid) -> Option<&mut Budget> {
        self.budgets.iter_mut().find(|budget| budget.id == id)
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Option<&mut SavingsGoal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    pub fn budgets_for_period(&self, period: PeriodKey) -> Vec<Budget> {
        self.budgets
            .iter()
            .filter(|budget| budget.period == period)
            .cloned()
            .collect()
    }

    /// Stored occurrences of a template keyed by the schedule slot they occupy.
    pub fn overrides_for_template(&self, template_id: Uuid) -> HashMap<NaiveDate, Occurrence> {
        self.occurrences
            .iter()
            .filter(|occurrence| occurrence.template_id == template_id)
            .map(|occurrence| (occurrence.slot_date, occurrence.clone()))
            .collect()
    }

    pub fn has_overrides(&self, template_id: Uuid) -> bool {
        self.occurrences
            .iter()
            .any(|occurrence| occurrence.template_id == template_id)
    }

    /// Stores `occurrence`, replacing any previous one for the same template slot.
    pub fn upsert_occurrence(&mut self, occurrence: Occurrence) {
        match self.occurrences.iter_mut().find(|existing| {
            existing.template_id == occurrence.template_id
                && existing.slot_date == occurrence.slot_date
        }) {
            Some(existing) => *existing = occurrence,
            None => self.occurrences.push(occurrence),
        }
        self.touch();
    }

    /// Removes an account together with the entries, templates and stored
    /// occurrences that reference it.
    pub fn remove_account(&mut self, id: Uuid) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|account| account.id != id);
        if self.accounts.len() == before {
            return false;
        }
        self.transactions.retain(|txn| !txn.touches_account(id));
        let removed_templates: Vec<Uuid> = self
            .templates
            .iter()
            .filter(|template| template.account_id == id)
            .map(|template| template.id)
            .collect();
        self.templates.retain(|template| template.account_id != id);
        self.occurrences.retain(|occurrence| {
            occurrence.account_id != id && !removed_templates.contains(&occurrence.template_id)
        });
        self.touch();
        true
    }

    /// Removes a category, clearing references to it and dropping its budgets.
    pub fn remove_category(&mut self, id: Uuid) -> bool {
        let before = self.categories.len();
        self.categories.retain(|category| category.id != id);
        if self.categories.len() == before {
            return false;
        }
        for txn in &mut self.transactions {
            if txn.category_id == Some(id) {
                txn.category_id = None;
            }
        }
        for template in &mut self.templates {
            if template.category_id == Some(id) {
                template.category_id = None;
            }
        }
        for occurrence in &mut self.occurrences {
            if occurrence.category_id == Some(id) {
                occurrence.category_id = None;
            }
        }
        self.budgets
            .retain(|budget| budget.category_id() != Some(id));
        self.touch();
        true
    }

    /// Deletes a template and its stored occurrences.
    pub fn remove_template(&mut self, id: Uuid) -> bool {
        let before = self.templates.len();
        self.templates.retain(|template| template.id != id);
        if self.templates.len() == before {
            return false;
        }
        self.occurrences
            .retain(|occurrence| occurrence.template_id != id);
        self.touch();
        true
    }

    pub fn remove_budget(&mut self, id: Uuid) -> bool {
        let before = self.budgets.len();
        self.budgets.retain(|budget| budget.id != id);
        let removed = self.budgets.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Adds the built-in categories when the ledger has none. Returns how many
    /// were added.
    pub fn seed_default_categories(&mut self) -> usize {
        if !self.categories.is_empty() {
            return 0;
        }
        self.categories = default_categories();
        self.touch();
        self.categories.len()
    }

    /// Converts transactions carrying a legacy repeat flag into recurring
    /// templates. The original entry stays as the first booked instance, so the
    /// template's first slot is stored as an occurrence to avoid counting it twice.
    pub fn migrate_legacy_recurrences(&mut self) -> usize {
        let mut created = Vec::new();
        for txn in &mut self.transactions {
            if let Some(template) = RecurringTemplate::from_legacy(txn) {
                txn.legacy_recurrence = LegacyRecurrence::None;
                created.push(template);
            }
        }
        let count = created.len();
        for template in created {
            let mut first = template.project(template.start_date);
            first.state = OccurrenceState::Deleted;
            self.occurrences.push(first);
            self.templates.push(template);
        }
        if count > 0 {
            self.touch();
        }
        count
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
