use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{Ledger, SavingsGoal};

use super::{ServiceError, ServiceResult};

pub struct GoalService;

impl GoalService {
    pub fn add(ledger: &mut Ledger, goal: SavingsGoal) -> ServiceResult<Uuid> {
        if goal.name.trim().is_empty() {
            return Err(ServiceError::Invalid("Goal name cannot be empty".into()));
        }
        if goal.target_amount <= 0.0 {
            return Err(ServiceError::Invalid("Goal target must be positive".into()));
        }
        Ok(ledger.add_goal(goal))
    }

    /// Adds `amount` (negative to withdraw) and reports whether the goal is reached.
    pub fn contribute(ledger: &mut Ledger, id: Uuid, amount: f64) -> ServiceResult<bool> {
        if !amount.is_finite() || amount == 0.0 {
            return Err(ServiceError::Invalid("Contribution must be non-zero".into()));
        }
        let goal = ledger
            .goal_mut(id)
            .ok_or_else(|| ServiceError::Invalid("Goal not found".into()))?;
        goal.contribute(amount);
        let reached = goal.is_reached();
        if reached {
            tracing::info!(goal = %id, "savings goal reached");
        }
        ledger.touch();
        Ok(reached)
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<()> {
        let before = ledger.goals.len();
        ledger.goals.retain(|goal| goal.id != id);
        if ledger.goals.len() == before {
            return Err(ServiceError::Invalid("Goal not found".into()));
        }
        ledger.touch();
        Ok(())
    }

    pub fn overdue(ledger: &Ledger, today: NaiveDate) -> Vec<&SavingsGoal> {
        ledger
            .goals
            .iter()
            .filter(|goal| goal.is_overdue(today))
            .collect()
    }
}
