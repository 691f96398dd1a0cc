#![doc(test(attr(deny(warnings))))]

//! Pocket Ledger is a personal-finance core: accounts, transactions, recurring
//! templates, budgets and savings goals, with budget alerts raised once per
//! budget and month.

pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod notify;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Pocket Ledger tracing initialized.");
    });
}
