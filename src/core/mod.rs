//! Recurrence expansion, budget evaluation and the services built on them.

pub mod aggregation;
pub mod context;
pub mod evaluator;
pub mod expander;
pub mod jobs;
pub mod services;

pub use context::AppContext;
pub use evaluator::{evaluate, AlertKey, BudgetAlert, BudgetStatus, ALERT_THRESHOLD};
pub use expander::{expand, expand_all};
pub use jobs::{Job, JobQueue, JobRecord, JobStatus};
