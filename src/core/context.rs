use std::sync::Arc;

use crate::{
    config::Config,
    currency::{CachedRates, RateProvider, StaticRates},
    errors::LedgerError,
    notify::{LogNotifier, Notifier},
    storage::{AlertLog, JsonAlertLog, JsonStorage, LedgerStore, MemoryAlertLog},
    time::{Clock, SystemClock},
};

const ALERT_LOG_FILE: &str = "alerts.json";

/// Collaborators shared by services and jobs, built once at start-up.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn LedgerStore>,
    pub alerts: Arc<dyn AlertLog>,
    pub notifier: Arc<dyn Notifier>,
    pub rates: Arc<dyn RateProvider>,
    /// Set when `rates` is a TTL cache that jobs may expire.
    pub rate_cache: Option<Arc<CachedRates>>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

impl AppContext {
    /// In-memory alert log, logging notifier, empty rate table and system clock.
    pub fn new(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        Self {
            store,
            alerts: Arc::new(MemoryAlertLog::new()),
            notifier: Arc::new(LogNotifier),
            rates: Arc::new(StaticRates::new()),
            rate_cache: None,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// File-backed context rooted at the configured data directory.
    pub fn open(config: Config, ledger_name: &str) -> Result<Self, LedgerError> {
        let root = config.resolve_data_dir();
        let storage = JsonStorage::new(&root)?;
        let alerts = JsonAlertLog::open(&root.join(ALERT_LOG_FILE))?;
        tracing::info!(root = %root.display(), ledger = ledger_name, "opened ledger context");
        Ok(Self::new(Arc::new(storage.open(ledger_name)), config).with_alerts(Arc::new(alerts)))
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertLog>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_rates(mut self, rates: Arc<dyn RateProvider>) -> Self {
        self.rates = rates;
        self.rate_cache = None;
        self
    }

    pub fn with_rate_cache(mut self, cache: Arc<CachedRates>) -> Self {
        self.rates = Arc::clone(&cache) as Arc<dyn RateProvider>;
        self.rate_cache = Some(cache);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
