//! Budget-aware insight aggregation
//!
//! Sends one expense snapshot to the insight backend, then checks the top
//! category it reports against this month's budget for that category.

use tracing::{debug, warn};

use crate::ai::{InsightBackend, InsightRequest};
use crate::config::BudgetPolicy;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Expense, Month};

use super::types::{InsightResult, Severity};

/// Budget lookup used by the aggregator
pub trait BudgetSource {
    fn budgets_for_month(&self, owner: &str, month: Month) -> Result<Vec<Budget>>;
}

impl BudgetSource for Database {
    fn budgets_for_month(&self, owner: &str, month: Month) -> Result<Vec<Budget>> {
        self.list_budgets_for_month(owner, month)
    }
}

/// Insight returned when the user has no expenses
pub fn no_data_insight() -> InsightResult {
    InsightResult::new("No insights yet", "Add expenses to get AI insights")
        .with_percentage(0)
        .with_severity(Severity::Info)
}

/// Integer percent of `limit` used by `spent`, rounded half away from zero
pub fn budget_usage(spent: f64, limit: f64) -> i64 {
    (spent / limit * 100.0).round() as i64
}

/// Annotate `insight` with the usage of `category`'s budget
///
/// Sets `budgetUsage` and, at or above the policy thresholds, appends a
/// notice to the message and raises the severity. Returns the usage.
pub fn apply_budget(
    insight: &mut InsightResult,
    category: &str,
    top_total: f64,
    limit: f64,
    policy: &BudgetPolicy,
) -> i64 {
    let usage = budget_usage(top_total, limit);
    insight.budget_usage = Some(usage);

    if usage >= policy.danger_threshold {
        insight.append_notice(&format!("🚨 You have exceeded your {} budget.", category));
        insight.set_severity(Severity::Danger);
    } else if usage >= policy.warning_threshold {
        insight.append_notice(&format!(
            "⚠️ You’ve used {}% of your {} budget.",
            usage, category
        ));
        insight.set_severity(Severity::Warning);
    }

    usage
}

/// Produce the insight for `owner`
///
/// `expenses` is the snapshot sent to the backend and the one used to total
/// the top category. `month` selects the budgets considered (normally
/// [`Month::current`]). A failing budget lookup is logged and the insight is
/// returned without budget annotations.
pub async fn generate_insight<B, S>(
    backend: &B,
    budgets: &S,
    owner: &str,
    expenses: &[Expense],
    month: Month,
    policy: &BudgetPolicy,
) -> Result<InsightResult>
where
    B: InsightBackend + ?Sized,
    S: BudgetSource + Sync + ?Sized,
{
    if expenses.is_empty() {
        return Ok(no_data_insight());
    }

    let request = InsightRequest::from_expenses(expenses);
    let mut insight = backend.generate(&request).await?;
    // Only a budget found below may set usage
    insight.budget_usage = None;

    let Some(top_category) = insight.resolved_top_category().map(str::to_string) else {
        debug!("Insight has no top category, skipping budget check");
        return Ok(insight);
    };

    let top_total: f64 = request
        .expenses
        .iter()
        .filter(|e| e.category == top_category)
        .map(|e| e.amount)
        .sum();

    let limit = match budgets.budgets_for_month(owner, month) {
        Ok(list) => list
            .into_iter()
            .find(|b| b.category == top_category)
            .map(|b| b.limit),
        Err(e) => {
            warn!(
                owner = %owner,
                month = %month,
                error = %e,
                "Budget lookup failed, returning insight without budget usage"
            );
            return Ok(insight);
        }
    };

    match limit {
        Some(limit) if limit > 0.0 => {
            let usage = apply_budget(&mut insight, &top_category, top_total, limit, policy);
            debug!(category = %top_category, usage, "Applied budget to insight");
        }
        _ => debug!(category = %top_category, month = %month, "No budget for top category"),
    }

    Ok(insight)
}
