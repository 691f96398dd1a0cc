use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::period::PeriodKey;

/// A spending ceiling for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub amount: f64,
    pub period: PeriodKey,
    pub scope: BudgetScope,
}

impl Budget {
    pub fn global(amount: f64, period: PeriodKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            period,
            scope: BudgetScope::Global,
        }
    }

    pub fn for_category(category_id: Uuid, amount: f64, period: PeriodKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            period,
            scope: BudgetScope::Category(category_id),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.scope, BudgetScope::Global)
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match self.scope {
            BudgetScope::Global => None,
            BudgetScope::Category(id) => Some(id),
        }
    }
}

/// What a budget measures: total spend or one category's spend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BudgetScope {
    Global,
    Category(Uuid),
}
