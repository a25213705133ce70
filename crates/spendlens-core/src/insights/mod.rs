//! Spending insights
//!
//! - `aggregator` - merges insight service output with the user's budgets
//! - `budget` - per-budget spending progress
//! - `types` - insight result and severity

mod aggregator;
mod budget;
pub mod types;

pub use aggregator::{
    apply_budget, budget_usage, generate_insight, no_data_insight, BudgetSource,
};
pub use budget::{budget_progress, BudgetProgress};
pub use types::{InsightResult, Severity};
