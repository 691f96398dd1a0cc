//! Currency codes and exchange-rate lookup.
//!
//! Rates are supplied through [`RateProvider`]. The remote fetch lives outside the
//! crate behind [`RateSource`]; [`CachedRates`] keeps the last fetched table for a
//! configurable time-to-live.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::LedgerError, time::Clock};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Answers "how many `to` for one `from`".
pub trait RateProvider: Send + Sync {
    fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64>;

    /// Converts `amount` or returns `None` when no rate is known.
    fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(amount);
        }
        self.get_rate(from, to).map(|rate| amount * rate)
    }
}

/// In-memory rate table. Looks up direct pairs first, then the inverse pair.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.insert(CurrencyCode::new(from), CurrencyCode::new(to), rate);
        self
    }

    pub fn insert(&mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) {
        self.rates.insert((from, to), rate);
    }

    /// Builds a table from `base -> quote` rates as returned by a rate feed.
    pub fn from_base(base: &CurrencyCode, quotes: &HashMap<String, f64>) -> Self {
        let mut table = Self::new();
        for (quote, rate) in quotes {
            table.insert(base.clone(), CurrencyCode::new(quote.as_str()), *rate);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateProvider for StaticRates {
    fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Some(*rate);
        }
        self.rates
            .get(&(to.clone(), from.clone()))
            .filter(|rate| rate.abs() > f64::EPSILON)
            .map(|rate| 1.0 / rate)
    }
}

/// Fetches `base -> quote` rates from somewhere outside the process.
pub trait RateSource: Send + Sync {
    fn fetch(&self, base: &CurrencyCode) -> Result<HashMap<String, f64>, LedgerError>;
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    table: StaticRates,
}

/// Caches rate tables per base currency and refetches once they are older than `ttl`.
///
/// A failed refresh keeps serving the stale table when one exists.
pub struct CachedRates {
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cache: RwLock<HashMap<CurrencyCode, CacheEntry>>,
}

impl CachedRates {
    pub fn new(source: Arc<dyn RateSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every cached table.
    pub fn clear(&self) -> Result<usize, LedgerError> {
        let mut cache = self.cache.write().map_err(|_| LedgerError::Poisoned)?;
        let count = cache.len();
        cache.clear();
        Ok(count)
    }

    /// Rate from the table cached for `from`, with whether that table is still
    /// fresh. `None` when no table for `from` was fetched yet.
    fn cached_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<(Option<f64>, bool)> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(from)?;
        let fresh = self.clock.now() - entry.fetched_at < self.ttl;
        Some((entry.table.get_rate(from, to), fresh))
    }

    fn refresh(&self, base: &CurrencyCode) -> Option<()> {
        match self.source.fetch(base) {
            Ok(quotes) => {
                let table = StaticRates::from_base(base, &quotes);
                tracing::debug!(base = %base, quotes = table.len(), "refreshed exchange rates");
                let mut cache = self.cache.write().ok()?;
                cache.insert(
                    base.clone(),
                    CacheEntry {
                        fetched_at: self.clock.now(),
                        table,
                    },
                );
                Some(())
            }
            Err(err) => {
                tracing::warn!(base = %base, error = %err, "exchange rate refresh failed");
                None
            }
        }
    }
}

impl RateProvider for CachedRates {
    fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        // A fresh table answers even when it lacks the pair.
        match self.cached_rate(from, to) {
            Some((rate, true)) => rate,
            stale => {
                if self.refresh(from).is_some() {
                    self.cached_rate(from, to).and_then(|(rate, _)| rate)
                } else {
                    stale.and_then(|(rate, _)| rate)
                }
            }
        }
    }
}
