pub mod alert_service;
pub mod budget_service;
pub mod goal_service;
pub mod template_service;

pub use alert_service::AlertService;
pub use budget_service::BudgetService;
pub use goal_service::GoalService;
pub use template_service::{TemplateRemoval, TemplateService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
