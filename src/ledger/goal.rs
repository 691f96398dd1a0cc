use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings target the user contributes towards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub saved_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            saved_amount: 0.0,
            deadline: None,
        }
    }

    /// Adds to the saved amount, never letting it drop below zero.
    pub fn contribute(&mut self, amount: f64) {
        self.saved_amount = (self.saved_amount + amount).max(0.0);
    }

    /// Share of the target reached, capped at 1.0. Zero targets report 0.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.saved_amount / self.target_amount).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.saved_amount).max(0.0)
    }

    pub fn is_reached(&self) -> bool {
        self.target_amount > 0.0 && self.saved_amount >= self.target_amount
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_reached() && self.deadline.is_some_and(|deadline| today > deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_and_completion() {
        let mut goal = SavingsGoal::new("Bike", 400.0);
        goal.contribute(100.0);
        assert_eq!(goal.progress(), 0.25);
        assert_eq!(goal.remaining(), 300.0);
        goal.contribute(350.0);
        assert!(goal.is_reached());
        assert_eq!(goal.progress(), 1.0);
    }

    #[test]
    fn withdrawals_do_not_go_negative() {
        let mut goal = SavingsGoal::new("Trip", 100.0);
        goal.contribute(20.0);
        goal.contribute(-50.0);
        assert_eq!(goal.saved_amount, 0.0);
    }

    #[test]
    fn overdue_only_when_unreached_past_deadline() {
        let mut goal = SavingsGoal::new("Laptop", 1000.0);
        goal.deadline = NaiveDate::from_ymd_opt(2024, 6, 30);
        let after = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(goal.is_overdue(after));
        goal.contribute(1000.0);
        assert!(!goal.is_overdue(after));
    }
}
