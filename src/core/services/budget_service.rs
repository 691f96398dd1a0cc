use uuid::Uuid;

use crate::{
    core::{
        aggregation::{aggregate_spend, AccountScope},
        evaluator::{budget_statuses, BudgetStatus},
    },
    currency::{CurrencyCode, RateProvider},
    ledger::{Budget, BudgetScope, CategoryKind, Ledger, PeriodKey},
};

use super::{ServiceError, ServiceResult};

pub struct BudgetService;

impl BudgetService {
    pub fn add(ledger: &mut Ledger, budget: Budget) -> ServiceResult<Uuid> {
        Self::validate_amount(budget.amount)?;
        if let BudgetScope::Category(category_id) = budget.scope {
            let category = ledger
                .category(category_id)
                .ok_or_else(|| ServiceError::Invalid("Category not found".into()))?;
            if category.kind != CategoryKind::Expense {
                return Err(ServiceError::Invalid(format!(
                    "Category `{}` is not an expense category",
                    category.name
                )));
            }
        }
        let duplicate = ledger
            .budgets
            .iter()
            .any(|existing| existing.period == budget.period && existing.scope == budget.scope);
        if duplicate {
            return Err(ServiceError::Invalid(format!(
                "A budget for this scope already exists in {}",
                budget.period
            )));
        }
        let id = ledger.add_budget(budget);
        tracing::info!(budget = %id, "budget added");
        Ok(id)
    }

    pub fn edit_amount(ledger: &mut Ledger, id: Uuid, amount: f64) -> ServiceResult<()> {
        Self::validate_amount(amount)?;
        let budget = ledger
            .budget_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Budget not found".into()))?;
        budget.amount = amount;
        ledger.touch();
        Ok(())
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<()> {
        if ledger.remove_budget(id) {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Budget not found".into()))
        }
    }

    /// Copies every budget of `from` into `to` unless `to` already has one for the
    /// same scope. Returns how many were created.
    pub fn roll_over(ledger: &mut Ledger, from: PeriodKey, to: PeriodKey) -> usize {
        let existing = ledger.budgets_for_period(to);
        let carried: Vec<Budget> = ledger
            .budgets_for_period(from)
            .into_iter()
            .filter(|budget| !existing.iter().any(|other| other.scope == budget.scope))
            .map(|budget| Budget {
                id: Uuid::new_v4(),
                period: to,
                ..budget
            })
            .collect();
        let count = carried.len();
        for budget in carried {
            ledger.add_budget(budget);
        }
        count
    }

    /// Usage of every budget of `period`, spend converted into `base`.
    pub fn statuses(
        ledger: &Ledger,
        period: PeriodKey,
        rates: &dyn RateProvider,
        base: &CurrencyCode,
    ) -> Vec<BudgetStatus> {
        let spend = aggregate_spend(ledger, period, AccountScope::All, rates, base);
        budget_statuses(
            period,
            &ledger.budgets_for_period(period),
            &spend.by_category,
            spend.total,
        )
    }

    fn validate_amount(amount: f64) -> ServiceResult<()> {
        if amount.is_finite() && amount > 0.0 {
            Ok(())
        } else {
            Err(ServiceError::Invalid("Budget amount must be positive".into()))
        }
    }
}
