//! Decides which budgets have newly crossed the alert threshold in a period.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{Budget, BudgetScope, PeriodKey};

/// Spend-to-budget ratio at which a budget alert fires. There is a single alert
/// point per budget and period.
pub const ALERT_THRESHOLD: f64 = 0.8;

/// Identifies one raised alert: a budget within one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub budget_id: Uuid,
    pub period: PeriodKey,
}

impl AlertKey {
    pub fn new(budget_id: Uuid, period: PeriodKey) -> Self {
        Self { budget_id, period }
    }
}

/// A budget that should be alerted on.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub budget_id: Uuid,
    pub period: PeriodKey,
    pub scope: BudgetScope,
    pub spent: f64,
    pub budget_amount: f64,
    pub ratio: f64,
}

impl BudgetAlert {
    pub fn key(&self) -> AlertKey {
        AlertKey::new(self.budget_id, self.period)
    }
}

/// Usage of one budget, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub scope: BudgetScope,
    pub spent: f64,
    pub budget_amount: f64,
    pub ratio: f64,
    pub remaining: f64,
}

impl BudgetStatus {
    pub fn is_over_threshold(&self) -> bool {
        self.ratio >= ALERT_THRESHOLD
    }

    pub fn is_exceeded(&self) -> bool {
        self.spent > self.budget_amount
    }
}

fn spend_for(
    budget: &Budget,
    spend_by_category: &HashMap<Uuid, f64>,
    total_spend: f64,
) -> f64 {
    match budget.scope {
        BudgetScope::Global => total_spend,
        BudgetScope::Category(category_id) => {
            spend_by_category.get(&category_id).copied().unwrap_or(0.0)
        }
    }
}

/// Returns the budgets of `period` whose spend ratio reached [`ALERT_THRESHOLD`]
/// and that have not been alerted for `period` yet.
///
/// Budgets from other periods and budgets with a non-positive amount are ignored.
/// Each budget appears at most once, in input order.
pub fn evaluate(
    period: PeriodKey,
    budgets: &[Budget],
    spend_by_category: &HashMap<Uuid, f64>,
    total_spend: f64,
    already_alerted: &HashSet<AlertKey>,
) -> Vec<BudgetAlert> {
    let mut seen = HashSet::new();
    let alerts: Vec<BudgetAlert> = budgets
        .iter()
        .filter(|budget| budget.period == period && budget.amount > 0.0)
        .filter(|budget| !already_alerted.contains(&AlertKey::new(budget.id, period)))
        .filter_map(|budget| {
            let spent = spend_for(budget, spend_by_category, total_spend);
            let ratio = spent / budget.amount;
            (ratio >= ALERT_THRESHOLD && seen.insert(budget.id)).then(|| BudgetAlert {
                budget_id: budget.id,
                period,
                scope: budget.scope,
                spent,
                budget_amount: budget.amount,
                ratio,
            })
        })
        .collect();
    tracing::debug!(period = %period, budgets = budgets.len(), alerts = alerts.len(), "evaluated budgets");
    alerts
}

/// Spend, ratio and remaining amount for every budget of `period` with a
/// positive amount.
pub fn budget_statuses(
    period: PeriodKey,
    budgets: &[Budget],
    spend_by_category: &HashMap<Uuid, f64>,
    total_spend: f64,
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .filter(|budget| budget.period == period && budget.amount > 0.0)
        .map(|budget| {
            let spent = spend_for(budget, spend_by_category, total_spend);
            BudgetStatus {
                budget_id: budget.id,
                scope: budget.scope,
                spent,
                budget_amount: budget.amount,
                ratio: spent / budget.amount,
                remaining: budget.amount - spent,
            }
        })
        .collect()
}
