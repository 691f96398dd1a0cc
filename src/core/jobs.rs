//! Explicit queue for background maintenance work.

use std::{collections::VecDeque, fmt};

use crate::{
    errors::LedgerError,
    ledger::PeriodKey,
    storage::with_ledger_mut,
};

use super::{context::AppContext, services::AlertService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    SeedDefaultCategories,
    MigrateLegacyRecurrences,
    BudgetCheck(PeriodKey),
    ClearRateCache,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::SeedDefaultCategories => f.write_str("seed default categories"),
            Job::MigrateLegacyRecurrences => f.write_str("migrate legacy recurrences"),
            Job::BudgetCheck(period) => write!(f, "budget check {}", period),
            Job::ClearRateCache => f.write_str("clear rate cache"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job: Job,
    pub status: JobStatus,
}

impl JobRecord {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded(_))
    }
}

/// FIFO of pending jobs plus the record of every job already run.
#[derive(Debug, Default)]
pub struct JobQueue {
    pending: VecDeque<Job>,
    history: Vec<JobRecord>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, job: Job) {
        self.pending.push_back(job);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn history(&self) -> &[JobRecord] {
        &self.history
    }

    /// Runs every pending job in order. A failing job is recorded and does not
    /// stop the ones after it.
    pub fn run_pending(&mut self, ctx: &AppContext) -> Vec<JobRecord> {
        let mut records = Vec::new();
        while let Some(job) = self.pending.pop_front() {
            let status = match run_job(&job, ctx) {
                Ok(summary) => {
                    tracing::info!(job = %job, summary = %summary, "job finished");
                    JobStatus::Succeeded(summary)
                }
                Err(reason) => {
                    tracing::warn!(job = %job, error = %reason, "job failed");
                    JobStatus::Failed(reason)
                }
            };
            records.push(JobRecord { job, status });
        }
        self.history.extend(records.iter().cloned());
        records
    }
}

fn run_job(job: &Job, ctx: &AppContext) -> Result<String, String> {
    match job {
        Job::SeedDefaultCategories => {
            with_ledger_mut(ctx.store.as_ref(), |ledger| {
                Ok::<_, LedgerError>(ledger.seed_default_categories())
            })
            .map(|count| format!("added {} categories", count))
            .map_err(|err| err.to_string())
        }
        Job::MigrateLegacyRecurrences => {
            with_ledger_mut(ctx.store.as_ref(), |ledger| {
                Ok::<_, LedgerError>(ledger.migrate_legacy_recurrences())
            })
            .map(|count| format!("created {} templates", count))
            .map_err(|err| err.to_string())
        }
        Job::BudgetCheck(period) => AlertService::run_budget_check(ctx, *period)
            .map(|alerts| format!("{} alerts", alerts.len()))
            .map_err(|err| err.to_string()),
        Job::ClearRateCache => match &ctx.rate_cache {
            Some(cache) => cache
                .clear()
                .map(|count| format!("cleared {} rate tables", count))
                .map_err(|err| err.to_string()),
            None => Ok("no rate cache configured".into()),
        },
    }
}
