//! Aggregates monthly spend from one-off entries and expanded recurring templates.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::expander::expand;
use crate::{
    currency::{CurrencyCode, RateProvider},
    ledger::{FlowType, Ledger, Occurrence, PeriodKey, RecurringTemplate, Transaction},
};

/// Which accounts contribute to an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountScope {
    #[default]
    All,
    Only(Uuid),
}

impl AccountScope {
    pub fn includes(&self, account_id: Uuid) -> bool {
        match self {
            AccountScope::All => true,
            AccountScope::Only(id) => *id == account_id,
        }
    }
}

/// Expense totals for one period, in the base currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendSummary {
    pub total: f64,
    pub by_category: HashMap<Uuid, f64>,
    /// Entries left out because no exchange rate was available.
    pub unconverted: usize,
}

impl SpendSummary {
    fn add(&mut self, category_id: Option<Uuid>, amount: f64) {
        self.total += amount;
        if let Some(category_id) = category_id {
            *self.by_category.entry(category_id).or_insert(0.0) += amount;
        }
    }
}

/// Every entry booked within `period`: one-off transactions plus expanded
/// template occurrences.
#[derive(Debug, Clone, Default)]
pub struct PeriodEntries {
    pub transactions: Vec<Transaction>,
    pub occurrences: Vec<Occurrence>,
}

/// Collects the one-off transactions and the materialized recurring occurrences
/// booked within `period`. Modified occurrences count in the month of their
/// effective date, even when their schedule slot lies in another month.
pub fn entries_for_period(ledger: &Ledger, period: PeriodKey) -> PeriodEntries {
    let Some((start, end)) = period.date_range() else {
        return PeriodEntries::default();
    };
    let transactions = ledger
        .transactions
        .iter()
        .filter(|txn| txn.date >= start && txn.date < end)
        .cloned()
        .collect();

    let mut occurrences = Vec::new();
    for template in &ledger.templates {
        let overrides = ledger.overrides_for_template(template.id);
        occurrences.extend(
            expand(template, start, end, &overrides)
                .into_iter()
                .filter(|occurrence| period.contains(occurrence.date)),
        );
        occurrences.extend(moved_into_range(template, &overrides, start, end));
    }
    occurrences.sort_by_key(|occurrence| (occurrence.date, occurrence.template_id));
    PeriodEntries {
        transactions,
        occurrences,
    }
}

fn moved_into_range(
    template: &RecurringTemplate,
    overrides: &HashMap<NaiveDate, Occurrence>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Occurrence> {
    overrides
        .values()
        .filter(|stored| stored.is_modified())
        .filter(|stored| stored.slot_date < start || stored.slot_date >= end)
        .filter(|stored| stored.date >= start && stored.date < end)
        .filter_map(|stored| {
            let next = stored.slot_date.succ_opt()?;
            // Only slots the template still schedules are honoured.
            Some(expand(template, stored.slot_date, next, overrides))
        })
        .flatten()
        .collect()
}

/// Sums expense spend for `period` and `scope`, converted into `base`.
///
/// Income and transfers never count as spend. Entries whose account currency
/// cannot be converted are skipped and counted in [`SpendSummary::unconverted`].
pub fn aggregate_spend(
    ledger: &Ledger,
    period: PeriodKey,
    scope: AccountScope,
    rates: &dyn RateProvider,
    base: &CurrencyCode,
) -> SpendSummary {
    let entries = entries_for_period(ledger, period);
    let mut summary = SpendSummary::default();
    let expenses = entries
        .transactions
        .iter()
        .filter(|txn| txn.is_expense())
        .map(|txn| (txn.account_id, txn.category_id, txn.amount))
        .chain(
            entries
                .occurrences
                .iter()
                .filter(|occurrence| occurrence.flow == FlowType::Expense)
                .map(|occurrence| {
                    (
                        occurrence.account_id,
                        occurrence.category_id,
                        occurrence.amount,
                    )
                }),
        );

    for (account_id, category_id, amount) in expenses {
        if !scope.includes(account_id) {
            continue;
        }
        let currency = ledger
            .account(account_id)
            .map(|account| account.currency.clone())
            .unwrap_or_else(|| base.clone());
        match rates.convert(amount, &currency, base) {
            Some(converted) => summary.add(category_id, converted),
            None => {
                tracing::warn!(
                    from = %currency,
                    to = %base,
                    "no exchange rate, entry left out of spend"
                );
                summary.unconverted += 1;
            }
        }
    }
    summary
}
