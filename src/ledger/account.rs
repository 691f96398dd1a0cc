use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyCode;

/// Represents a money container that transactions and templates are booked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Account {
    /// Creates a new account in the default currency with a zero opening balance.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            currency: CurrencyCode::default(),
            opening_balance: 0.0,
            notes: None,
        }
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Cash,
    Bank,
    Card,
    Savings,
}
