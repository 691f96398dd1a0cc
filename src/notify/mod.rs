//! Budget notification dispatch.

use std::sync::RwLock;

use uuid::Uuid;

use crate::{core::evaluator::BudgetAlert, ledger::PeriodKey};

/// Payload handed to a [`Notifier`] when a budget crosses its alert threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetNotification {
    pub budget_id: Uuid,
    pub period: PeriodKey,
    pub spent: f64,
    pub budget_amount: f64,
}

impl From<&BudgetAlert> for BudgetNotification {
    fn from(alert: &BudgetAlert) -> Self {
        Self {
            budget_id: alert.budget_id,
            period: alert.period,
            spent: alert.spent,
            budget_amount: alert.budget_amount,
        }
    }
}

/// Fire-and-forget delivery channel. Delivery failures stay inside the notifier.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &BudgetNotification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &BudgetNotification) {
        tracing::info!(
            budget = %notification.budget_id,
            period = %notification.period,
            spent = notification.spent,
            amount = notification.budget_amount,
            "budget alert"
        );
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RwLock<Vec<BudgetNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<BudgetNotification> {
        match self.sent.read() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &BudgetNotification) {
        match self.sent.write() {
            Ok(mut sent) => sent.push(notification.clone()),
            Err(poisoned) => poisoned.into_inner().push(notification.clone()),
        }
    }
}
