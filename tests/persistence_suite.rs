mod common;

use std::{fs, sync::Arc};

use common::{date, temp_root, Household};
use pocket_ledger::{
    config::Config,
    core::{services::BudgetService, AppContext},
    ledger::{Budget, Ledger},
    storage::{with_ledger_mut, AlertLog, JsonStorage, LedgerStore},
};

#[test]
fn saved_ledger_loads_back_with_its_entries() {
    let storage = JsonStorage::new(&temp_root()).unwrap();
    let mut household = Household::new();
    household.spend(household.food, date(2024, 6, 1), 12.5);
    storage.save_ledger("Household", &household.ledger).unwrap();

    let loaded = storage.load_ledger("household").unwrap();
    assert_eq!(loaded.id, household.ledger.id);
    assert_eq!(loaded.transactions.len(), 1);
    assert_eq!(storage.list_ledgers().unwrap(), vec!["household".to_string()]);

    storage.delete_ledger("household").unwrap();
    assert!(storage.list_ledgers().unwrap().is_empty());
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let storage = JsonStorage::new(&temp_root()).unwrap();
    let mut household = Household::new();
    storage.save_ledger("reliable", &household.ledger).unwrap();
    let path = storage.ledger_path("reliable");
    let original = fs::read_to_string(&path).unwrap();

    // A directory at the staging path makes the temp file creation fail.
    fs::create_dir_all(path.with_extension("json.tmp")).unwrap();
    household.spend(household.food, date(2024, 6, 1), 99.0);
    assert!(storage.save_ledger("reliable", &household.ledger).is_err());

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn restoring_a_backup_brings_back_the_previous_state() {
    let storage = JsonStorage::new(&temp_root()).unwrap();
    let mut household = Household::new();
    storage.save_ledger("home", &household.ledger).unwrap();
    household.spend(household.food, date(2024, 6, 1), 30.0);
    storage.save_ledger("home", &household.ledger).unwrap();

    let backups = storage.list_backups("home").unwrap();
    assert_eq!(backups.len(), 1);
    let restored = storage.restore_backup(&backups[0]).unwrap();
    assert!(restored.transactions.is_empty());
    assert!(storage.load_ledger("home").unwrap().transactions.is_empty());

    let manual = storage.backup_ledger("home").unwrap();
    assert!(manual.created_at.is_some());
    assert!(storage.backup_ledger("missing").is_err());
}

#[test]
fn failed_update_is_not_persisted() {
    let storage = JsonStorage::new(&temp_root()).unwrap();
    let store = storage.open("budgets");
    let june = "2024-06".parse().unwrap();

    with_ledger_mut(&store, |ledger| BudgetService::add(ledger, Budget::global(300.0, june)))
        .unwrap();
    let rejected =
        with_ledger_mut(&store, |ledger| BudgetService::add(ledger, Budget::global(-5.0, june)));
    assert!(rejected.is_err());

    assert_eq!(store.list_budgets_for_period(june).unwrap().len(), 1);
    assert_eq!(storage.list_backups("budgets").unwrap().len(), 0);
}

#[test]
fn context_opens_under_the_configured_data_dir() {
    let root = temp_root();
    let config = Config {
        data_dir: Some(root.clone()),
        ..Config::default()
    };
    let ctx = AppContext::open(config, "Family").unwrap();
    with_ledger_mut(ctx.store.as_ref(), |ledger: &mut Ledger| {
        Ok::<_, pocket_ledger::errors::LedgerError>(ledger.seed_default_categories())
    })
    .unwrap();
    ctx.alerts
        .mark_alerted(uuid::Uuid::new_v4(), "2024-06".parse().unwrap())
        .unwrap();

    assert!(root.join("ledgers").join("family.json").exists());
    assert!(root.join("alerts.json").exists());
    let reopened: Arc<dyn LedgerStore> = AppContext::open(
        Config {
            data_dir: Some(root),
            ..Config::default()
        },
        "family",
    )
    .unwrap()
    .store;
    assert_eq!(reopened.load().unwrap().categories.len(), 10);
}
