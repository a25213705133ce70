//! Per-budget spending progress

use serde::Serialize;

use crate::config::BudgetPolicy;
use crate::models::{Budget, Expense, Month};

use super::aggregator::budget_usage;
use super::types::Severity;

/// How much of one budget has been spent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    pub budget_id: i64,
    pub category: String,
    pub month: Month,
    pub limit: f64,
    pub spent: f64,
    /// Negative once the budget is exceeded
    pub remaining: f64,
    /// Integer percent of the limit, not clamped
    pub usage: i64,
    pub severity: Severity,
}

/// Progress for each budget, in the order given
///
/// Only expenses dated inside a budget's month with the same category count
/// toward it.
pub fn budget_progress(
    budgets: &[Budget],
    expenses: &[Expense],
    policy: &BudgetPolicy,
) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| {
            let spent: f64 = expenses
                .iter()
                .filter(|e| e.category == budget.category && budget.month.contains(e.date))
                .map(|e| e.amount)
                .sum();
            let usage = budget_usage(spent, budget.limit);
            let severity = if usage >= policy.danger_threshold {
                Severity::Danger
            } else if usage >= policy.warning_threshold {
                Severity::Warning
            } else {
                Severity::Info
            };

            BudgetProgress {
                budget_id: budget.id,
                category: budget.category.clone(),
                month: budget.month,
                limit: budget.limit,
                spent,
                remaining: budget.limit - spent,
                usage,
                severity,
            }
        })
        .collect()
}
