mod common;

use common::temp_root;
use pocket_ledger::{
    config::{Config, ConfigError, ConfigManager},
    currency::CurrencyCode,
};

#[test]
fn load_returns_defaults_until_saved() {
    let manager = ConfigManager::with_base_dir(temp_root()).unwrap();
    assert_eq!(manager.load().unwrap(), Config::default());

    let config = Config {
        locale: "de-DE".into(),
        base_currency: CurrencyCode::new("eur"),
        notifications_enabled: false,
        ..Config::default()
    };
    manager.save(&config).unwrap();
    assert!(manager.config_path().exists());
    assert_eq!(manager.load().unwrap(), config);
}

#[test]
fn backups_list_newest_first_and_restore() {
    let manager = ConfigManager::with_base_dir(temp_root()).unwrap();
    let first = Config {
        locale: "fr-FR".into(),
        ..Config::default()
    };
    let older = manager.backup(&first, Some("Before trip")).unwrap();
    let newer = manager.backup(&Config::default(), None).unwrap();
    assert!(older.ends_with("-before-trip.json"));

    assert_eq!(manager.list_backups().unwrap(), vec![newer, older.clone()]);
    let restored = manager.restore(&older).unwrap();
    assert_eq!(restored.locale, "fr-FR");
    assert_eq!(manager.load().unwrap().locale, "fr-FR");
}

#[test]
fn unknown_backup_and_corrupt_file_are_errors() {
    let manager = ConfigManager::with_base_dir(temp_root()).unwrap();
    assert!(matches!(
        manager.restore("config_0.json"),
        Err(ConfigError::Io(_))
    ));
    std::fs::write(manager.config_path(), "{ not json").unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}
