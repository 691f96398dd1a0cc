use crate::{
    core::{
        aggregation::{aggregate_spend, AccountScope},
        context::AppContext,
        evaluator::{evaluate, BudgetAlert},
    },
    ledger::PeriodKey,
    notify::BudgetNotification,
};

use super::ServiceResult;

pub struct AlertService;

impl AlertService {
    /// Evaluates the budgets of `period` against one ledger snapshot, notifies
    /// for each newly crossed budget and records the alert.
    ///
    /// With notifications disabled nothing is dispatched or recorded, so the
    /// alert fires once they are enabled again.
    pub fn run_budget_check(ctx: &AppContext, period: PeriodKey) -> ServiceResult<Vec<BudgetAlert>> {
        let ledger = ctx.store.load()?;
        let budgets = ledger.budgets_for_period(period);
        let spend = aggregate_spend(
            &ledger,
            period,
            AccountScope::All,
            ctx.rates.as_ref(),
            &ctx.config.base_currency,
        );
        let budget_ids: Vec<_> = budgets.iter().map(|budget| budget.id).collect();
        let already_alerted = ctx.alerts.alerted_keys(&budget_ids, period)?;
        let alerts = evaluate(
            period,
            &budgets,
            &spend.by_category,
            spend.total,
            &already_alerted,
        );

        if !ctx.config.notifications_enabled {
            tracing::debug!(period = %period, pending = alerts.len(), "notifications disabled");
            return Ok(alerts);
        }
        for alert in &alerts {
            ctx.notifier.notify(&BudgetNotification::from(alert));
            ctx.alerts.mark_alerted(alert.budget_id, alert.period)?;
        }
        if !alerts.is_empty() {
            tracing::info!(period = %period, alerts = alerts.len(), "budget alerts raised");
        }
        Ok(alerts)
    }

    /// Runs the check for the month containing the context clock's today.
    pub fn run_current_month(ctx: &AppContext) -> ServiceResult<Vec<BudgetAlert>> {
        Self::run_budget_check(ctx, PeriodKey::from_date(ctx.clock.today()))
    }

    /// Forgets the alerts of `period` so its budgets can alert again.
    pub fn reset_period(ctx: &AppContext, period: PeriodKey) -> ServiceResult<usize> {
        Ok(ctx.alerts.clear_period(period)?)
    }
}
