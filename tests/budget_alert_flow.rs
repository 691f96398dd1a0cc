mod common;

use common::{date, memory_context, Household};
use pocket_ledger::{
    core::services::{AlertService, BudgetService, TemplateService},
    ledger::{Budget, FlowType, Frequency, PeriodKey, RecurringTemplate},
    storage::{with_ledger_mut, AlertLog},
};

fn june() -> PeriodKey {
    "2024-06".parse().unwrap()
}

#[test]
fn global_budget_alerts_once_per_period() {
    let mut household = Household::new();
    let budget = BudgetService::add(&mut household.ledger, Budget::global(1000.0, june())).unwrap();
    household.spend(household.food, date(2024, 6, 3), 500.0);
    household.spend(household.housing, date(2024, 6, 9), 350.0);
    let test = memory_context(household.ledger, date(2024, 6, 20));

    let alerts = AlertService::run_current_month(&test.ctx).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].budget_id, budget);
    assert!((alerts[0].ratio - 0.85).abs() < 1e-9);
    assert!(test.alerts.has_alerted(budget, june()).unwrap());

    let sent = test.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].spent, 850.0);
    assert_eq!(sent[0].budget_amount, 1000.0);

    assert!(AlertService::run_budget_check(&test.ctx, june())
        .unwrap()
        .is_empty());
    assert_eq!(test.notifier.sent().len(), 1);
}

#[test]
fn category_budget_alerts_when_spend_reaches_its_limit() {
    let mut household = Household::new();
    let food = household.food;
    let budget =
        BudgetService::add(&mut household.ledger, Budget::for_category(food, 200.0, june()))
            .unwrap();
    household.spend(food, date(2024, 6, 2), 150.0);
    household.spend(household.housing, date(2024, 6, 2), 4000.0);
    let test = memory_context(household.ledger, date(2024, 6, 20));

    assert!(AlertService::run_budget_check(&test.ctx, june())
        .unwrap()
        .is_empty());

    with_ledger_mut(test.ctx.store.as_ref(), |ledger| {
        ledger.add_transaction(pocket_ledger::ledger::Transaction::new(
            ledger.accounts[0].id,
            Some(food),
            date(2024, 6, 18),
            50.0,
            FlowType::Expense,
        ));
        Ok::<_, pocket_ledger::errors::LedgerError>(())
    })
    .unwrap();

    let alerts = AlertService::run_budget_check(&test.ctx, june()).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].budget_id, budget);
    assert_eq!(alerts[0].ratio, 1.0);
}

#[test]
fn recurring_expenses_count_towards_budgets() {
    let mut household = Household::new();
    let housing = household.housing;
    let rent = RecurringTemplate::new(
        household.wallet,
        400.0,
        FlowType::Expense,
        date(2024, 1, 1),
        Frequency::Weekly,
        2,
    )
    .with_category(housing);
    TemplateService::create(&mut household.ledger, rent).unwrap();
    BudgetService::add(
        &mut household.ledger,
        Budget::for_category(housing, 1500.0, june()),
    )
    .unwrap();
    let test = memory_context(household.ledger, date(2024, 6, 1));

    // Every other Monday from Jan 1: June 3 and June 17.
    assert!(AlertService::run_budget_check(&test.ctx, june())
        .unwrap()
        .is_empty());

    let july: PeriodKey = "2024-07".parse().unwrap();
    with_ledger_mut(test.ctx.store.as_ref(), |ledger| {
        BudgetService::add(ledger, Budget::for_category(housing, 1500.0, july))
    })
    .unwrap();
    // July 1, 15 and 29 total 1200 of 1500, exactly the threshold.
    let alerts = AlertService::run_budget_check(&test.ctx, july).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].spent, 1200.0);
}

#[test]
fn disabled_notifications_leave_alerts_pending() {
    let mut household = Household::new();
    BudgetService::add(&mut household.ledger, Budget::global(100.0, june())).unwrap();
    household.spend(household.food, date(2024, 6, 5), 90.0);
    let mut test = memory_context(household.ledger, date(2024, 6, 20));
    test.ctx.config.notifications_enabled = false;

    assert_eq!(AlertService::run_current_month(&test.ctx).unwrap().len(), 1);
    assert!(test.notifier.sent().is_empty());

    test.ctx.config.notifications_enabled = true;
    assert_eq!(AlertService::run_current_month(&test.ctx).unwrap().len(), 1);
    assert_eq!(test.notifier.sent().len(), 1);
}

#[test]
fn reset_period_allows_a_new_alert() {
    let mut household = Household::new();
    BudgetService::add(&mut household.ledger, Budget::global(100.0, june())).unwrap();
    household.spend(household.food, date(2024, 6, 5), 95.0);
    let test = memory_context(household.ledger, date(2024, 6, 20));

    AlertService::run_budget_check(&test.ctx, june()).unwrap();
    assert_eq!(AlertService::reset_period(&test.ctx, june()).unwrap(), 1);
    assert_eq!(AlertService::run_budget_check(&test.ctx, june()).unwrap().len(), 1);
    assert_eq!(test.notifier.sent().len(), 2);
}

#[test]
fn income_and_transfers_never_trigger_budgets() {
    let mut household = Household::new();
    BudgetService::add(&mut household.ledger, Budget::global(100.0, june())).unwrap();
    let savings = household.ledger.add_account(pocket_ledger::ledger::Account::new(
        "Savings",
        pocket_ledger::ledger::AccountKind::Savings,
    ));
    household.ledger.add_transaction(pocket_ledger::ledger::Transaction::new(
        household.wallet,
        Some(household.salary),
        date(2024, 6, 1),
        3000.0,
        FlowType::Income,
    ));
    household
        .ledger
        .add_transaction(pocket_ledger::ledger::Transaction::transfer(
            household.wallet,
            savings,
            date(2024, 6, 2),
            500.0,
        ));
    let test = memory_context(household.ledger, date(2024, 6, 20));
    assert!(AlertService::run_current_month(&test.ctx).unwrap().is_empty());
}
