use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorises ledger activity for budgeting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default)]
    pub is_custom: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            is_custom: true,
        }
    }

    fn built_in(name: &str, kind: CategoryKind) -> Self {
        Self {
            is_custom: false,
            ..Self::new(name, kind)
        }
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Expense,
    Income,
}

const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Housing",
    "Utilities",
    "Health",
    "Entertainment",
    "Shopping",
];
const DEFAULT_INCOME_CATEGORIES: &[&str] = &["Salary", "Gifts", "Interest"];

/// Built-in categories seeded into an empty ledger.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|name| Category::built_in(name, CategoryKind::Expense))
        .chain(
            DEFAULT_INCOME_CATEGORIES
                .iter()
                .map(|name| Category::built_in(name, CategoryKind::Income)),
        )
        .collect()
}
