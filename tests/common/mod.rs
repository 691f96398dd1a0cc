#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use pocket_ledger::{
    config::Config,
    core::AppContext,
    ledger::{Account, AccountKind, Category, CategoryKind, FlowType, Ledger, Transaction},
    notify::RecordingNotifier,
    storage::{MemoryAlertLog, MemoryStore},
    time::FixedClock,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Ledger with one wallet and the categories used across tests.
pub struct Household {
    pub ledger: Ledger,
    pub wallet: Uuid,
    pub food: Uuid,
    pub housing: Uuid,
    pub salary: Uuid,
}

impl Household {
    pub fn new() -> Self {
        let mut ledger = Ledger::new("Household");
        let wallet = ledger.add_account(Account::new("Wallet", AccountKind::Bank));
        let food = ledger.add_category(Category::new("Food", CategoryKind::Expense));
        let housing = ledger.add_category(Category::new("Housing", CategoryKind::Expense));
        let salary = ledger.add_category(Category::new("Salary", CategoryKind::Income));
        Self {
            ledger,
            wallet,
            food,
            housing,
            salary,
        }
    }

    pub fn spend(&mut self, category: Uuid, day: NaiveDate, amount: f64) {
        self.ledger.add_transaction(Transaction::new(
            self.wallet,
            Some(category),
            day,
            amount,
            FlowType::Expense,
        ));
    }
}

/// In-memory context pinned to `today`, with handles on its notifier and alert log.
pub struct TestContext {
    pub ctx: AppContext,
    pub notifier: Arc<RecordingNotifier>,
    pub alerts: Arc<MemoryAlertLog>,
}

pub fn memory_context(ledger: Ledger, today: NaiveDate) -> TestContext {
    let notifier = Arc::new(RecordingNotifier::new());
    let alerts = Arc::new(MemoryAlertLog::new());
    let ctx = AppContext::new(Arc::new(MemoryStore::new(ledger)), Config::default())
        .with_notifier(notifier.clone())
        .with_alerts(alerts.clone())
        .with_clock(Arc::new(FixedClock::at_date(today)));
    TestContext {
        ctx,
        notifier,
        alerts,
    }
}
