mod common;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use chrono::Duration;
use common::{date, memory_context, Household};
use pocket_ledger::{
    config::Config,
    core::{AppContext, Job, JobQueue, JobStatus},
    currency::{CachedRates, CurrencyCode, RateProvider, RateSource},
    errors::LedgerError,
    ledger::{Budget, FlowType, Ledger, LegacyRecurrence, Transaction},
    storage::LedgerStore,
    time::FixedClock,
};

struct CountingSource(AtomicUsize);

impl RateSource for CountingSource {
    fn fetch(&self, _base: &CurrencyCode) -> Result<HashMap<String, f64>, LedgerError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(HashMap::from([("USD".to_string(), 1.1)]))
    }
}

struct BrokenStore;

impl LedgerStore for BrokenStore {
    fn load(&self) -> Result<Ledger, LedgerError> {
        Err(LedgerError::NotFound("ledger `broken`".into()))
    }

    fn save(&self, _ledger: &Ledger) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[test]
fn startup_jobs_seed_migrate_and_check() {
    let mut household = Household::new();
    household.ledger.categories.clear();
    let mut legacy = Transaction::new(
        household.wallet,
        None,
        date(2024, 5, 20),
        600.0,
        FlowType::Expense,
    );
    legacy.legacy_recurrence = LegacyRecurrence::Monthly;
    household.ledger.add_transaction(legacy);
    household
        .ledger
        .add_budget(Budget::global(700.0, "2024-06".parse().unwrap()));
    let test = memory_context(household.ledger, date(2024, 6, 21));

    let mut queue = JobQueue::new();
    queue.enqueue(Job::SeedDefaultCategories);
    queue.enqueue(Job::MigrateLegacyRecurrences);
    queue.enqueue(Job::BudgetCheck("2024-06".parse().unwrap()));
    assert_eq!(queue.pending(), 3);

    let records = queue.run_pending(&test.ctx);
    assert_eq!(queue.pending(), 0);
    let statuses: Vec<_> = records.iter().map(|r| r.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            JobStatus::Succeeded("added 10 categories".into()),
            JobStatus::Succeeded("created 1 templates".into()),
            JobStatus::Succeeded("1 alerts".into()),
        ]
    );
    assert_eq!(test.notifier.sent().len(), 1);

    let ledger = test.ctx.store.load().unwrap();
    assert_eq!(ledger.templates.len(), 1);
    assert_eq!(ledger.categories.len(), 10);
}

#[test]
fn failing_job_is_recorded_and_the_queue_continues() {
    let ctx = AppContext::new(Arc::new(BrokenStore), Config::default());
    let mut queue = JobQueue::new();
    queue.enqueue(Job::SeedDefaultCategories);
    queue.enqueue(Job::ClearRateCache);

    let records = queue.run_pending(&ctx);
    assert!(matches!(&records[0].status, JobStatus::Failed(reason) if reason.contains("broken")));
    assert!(records[1].succeeded());
    assert_eq!(queue.history().len(), 2);
}

#[test]
fn clearing_the_rate_cache_forces_a_refetch() {
    let source = Arc::new(CountingSource(AtomicUsize::new(0)));
    let clock = Arc::new(FixedClock::at_date(date(2024, 6, 1)));
    let cache = Arc::new(CachedRates::new(source.clone(), clock, Duration::minutes(30)));
    let ctx = AppContext::new(Arc::new(pocket_ledger::storage::MemoryStore::new(Ledger::new("Fx"))), Config::default())
        .with_rate_cache(cache.clone());

    let eur = CurrencyCode::new("EUR");
    let usd = CurrencyCode::new("USD");
    assert_eq!(ctx.rates.get_rate(&eur, &usd), Some(1.1));
    assert_eq!(ctx.rates.get_rate(&eur, &usd), Some(1.1));
    assert_eq!(source.0.load(Ordering::SeqCst), 1);

    let mut queue = JobQueue::new();
    queue.enqueue(Job::ClearRateCache);
    let records = queue.run_pending(&ctx);
    assert_eq!(
        records[0].status,
        JobStatus::Succeeded("cleared 1 rate tables".into())
    );
    assert_eq!(ctx.rates.get_rate(&eur, &usd), Some(1.1));
    assert_eq!(source.0.load(Ordering::SeqCst), 2);
}
