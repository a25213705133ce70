//! Monthly report aggregation
//!
//! Turns one month of expenses into a [`ReportSummary`]: line items, grand
//! total, per-category totals, the top category and a savings sentence.
//! Rendering to PDF/CSV/JSON/text lives in [`crate::export`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::config::ReportSettings;
use crate::models::{Expense, Month};

pub const REPORT_TITLE: &str = "Expense Report";
pub const BALANCED_SUMMARY: &str = "Your spending looks balanced this month.";

/// One numbered expense row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// 1-based position in the report
    pub index: usize,
    pub expense_id: i64,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Aggregated monthly report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub title: String,
    pub month: Month,
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub total_spent: f64,
    pub category_totals: BTreeMap<String, f64>,
    pub top_category: Option<String>,
    /// Share of the total spent on the top category (integer percent)
    pub percentage: Option<i64>,
    /// Rounded saving suggested for the top category
    pub suggested_saving: Option<i64>,
    pub summary_text: String,
}

impl ReportSummary {
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Total for the top category
    pub fn top_category_total(&self) -> Option<f64> {
        self.top_category
            .as_ref()
            .and_then(|c| self.category_totals.get(c).copied())
    }
}

/// Categories ordered by total descending, then name ascending
pub fn rank_categories(totals: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = totals.iter().map(|(c, t)| (c.as_str(), *t)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

/// Format an amount without a trailing `.0` for whole values
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        let s = format!("{:.2}", amount);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Build the report for `month`
///
/// Expenses dated outside the month are dropped so callers can pass a
/// loosely filtered list. Input order is kept for the line items.
pub fn build_report(month: Month, expenses: &[Expense], settings: &ReportSettings) -> ReportSummary {
    let mut line_items = Vec::with_capacity(expenses.len());
    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_spent = 0.0;

    for expense in expenses {
        if !month.contains(expense.date) {
            debug!(
                expense_id = expense.id,
                date = %expense.date,
                month = %month,
                "Dropping expense outside report month"
            );
            continue;
        }

        total_spent += expense.amount;
        *category_totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
        line_items.push(LineItem {
            index: line_items.len() + 1,
            expense_id: expense.id,
            category: expense.category.clone(),
            amount: expense.amount,
            date: expense.date,
            description: expense.description.clone(),
        });
    }

    let mut summary = ReportSummary {
        title: REPORT_TITLE.to_string(),
        month,
        currency: settings.currency.clone(),
        line_items,
        total_spent,
        category_totals,
        top_category: None,
        percentage: None,
        suggested_saving: None,
        summary_text: BALANCED_SUMMARY.to_string(),
    };

    if summary.line_items.is_empty() || total_spent <= 0.0 {
        return summary;
    }

    let top = rank_categories(&summary.category_totals)
        .first()
        .map(|(category, amount)| (category.to_string(), *amount));

    if let Some((category, top_amount)) = top {
        let percentage = (top_amount / total_spent * 100.0).round() as i64;
        let suggested_saving = (top_amount * settings.saving_rate).round() as i64;

        summary.summary_text = format!(
            "Your highest spending was on {}, which accounted for {}% of your total expenses. \
             Reducing {} spending by {}{} could help you save more next month.",
            category,
            percentage,
            category.to_lowercase(),
            settings.currency,
            suggested_saving
        );
        summary.percentage = Some(percentage);
        summary.suggested_saving = Some(suggested_saving);
        summary.top_category = Some(category);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn expense(id: i64, category: &str, amount: f64, date: &str) -> Expense {
        Expense {
            id,
            owner: "alice".to_string(),
            category: category.to_string(),
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_scenario() {
        let expenses = vec![
            expense(1, "Food", 300.0, "2024-03-02"),
            expense(2, "Food", 200.0, "2024-03-10"),
            expense(3, "Travel", 100.0, "2024-03-20"),
        ];
        let report = build_report(month("2024-03"), &expenses, &ReportSettings::default());

        assert_eq!(report.title, "Expense Report");
        assert_eq!(report.total_spent, 600.0);
        assert_eq!(report.category_totals["Food"], 500.0);
        assert_eq!(report.category_totals["Travel"], 100.0);
        assert_eq!(report.top_category.as_deref(), Some("Food"));
        assert_eq!(report.top_category_total(), Some(500.0));
        assert_eq!(report.percentage, Some(83));
        assert_eq!(report.suggested_saving, Some(75));
        assert_eq!(
            report.summary_text,
            "Your highest spending was on Food, which accounted for 83% of your total expenses. \
             Reducing food spending by ₹75 could help you save more next month."
        );

        let indexes: Vec<usize> = report.line_items.iter().map(|l| l.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(report.line_items[2].category, "Travel");
    }

    #[test]
    fn test_empty_month_is_balanced() {
        let report = build_report(month("2024-03"), &[], &ReportSettings::default());
        assert!(report.is_empty());
        assert_eq!(report.total_spent, 0.0);
        assert!(report.category_totals.is_empty());
        assert_eq!(report.top_category, None);
        assert_eq!(report.summary_text, BALANCED_SUMMARY);
    }

    #[test]
    fn test_zero_total_is_balanced() {
        let expenses = vec![expense(1, "Food", 0.0, "2024-03-02")];
        let report = build_report(month("2024-03"), &expenses, &ReportSettings::default());
        assert_eq!(report.line_items.len(), 1);
        assert_eq!(report.top_category, None);
        assert_eq!(report.percentage, None);
        assert_eq!(report.summary_text, BALANCED_SUMMARY);
    }

    #[test]
    fn test_out_of_month_expenses_dropped() {
        let expenses = vec![
            expense(1, "Rent", 900.0, "2023-02-28"),
            expense(2, "Rent", 950.0, "2023-03-01"),
            expense(3, "Food", 40.0, "2023-02-01"),
        ];
        let report = build_report(month("2023-02"), &expenses, &ReportSettings::default());

        let ids: Vec<i64> = report.line_items.iter().map(|l| l.expense_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(report.line_items[1].index, 2);
        assert_eq!(report.total_spent, 940.0);
    }

    #[test]
    fn test_tie_break_is_alphabetical() {
        let expenses = vec![
            expense(1, "Travel", 100.0, "2024-03-02"),
            expense(2, "Food", 100.0, "2024-03-03"),
        ];
        let report = build_report(month("2024-03"), &expenses, &ReportSettings::default());
        assert_eq!(report.top_category.as_deref(), Some("Food"));
        assert_eq!(report.percentage, Some(50));
        assert_eq!(report.suggested_saving, Some(15));
    }

    #[test]
    fn test_aggregates_independent_of_input_order() {
        // Food and Travel tie at 200
        let expenses = vec![
            expense(1, "Travel", 50.5, "2024-03-02"),
            expense(2, "Food", 120.25, "2024-03-04"),
            expense(3, "Rent", 150.0, "2024-03-05"),
            expense(4, "Food", 79.75, "2024-03-11"),
            expense(5, "Travel", 149.5, "2024-03-19"),
        ];
        let mut reversed = expenses.clone();
        reversed.reverse();
        let mut rotated = expenses.clone();
        rotated.rotate_left(2);

        let settings = ReportSettings::default();
        let baseline = build_report(month("2024-03"), &expenses, &settings);
        assert_eq!(baseline.total_spent, 550.0);
        assert_eq!(baseline.top_category.as_deref(), Some("Food"));

        for ordering in [&expenses, &reversed, &rotated] {
            let report = build_report(month("2024-03"), ordering, &settings);
            let line_sum: f64 = report.line_items.iter().map(|l| l.amount).sum();

            assert_eq!(report.total_spent, line_sum);
            assert_eq!(report.total_spent, baseline.total_spent);
            assert_eq!(report.category_totals, baseline.category_totals);
            assert_eq!(report.top_category, baseline.top_category);
            assert_eq!(report.percentage, baseline.percentage);
            assert_eq!(report.summary_text, baseline.summary_text);
        }
    }

    #[test]
    fn test_custom_currency_and_rate() {
        let settings = ReportSettings {
            currency: "$".to_string(),
            saving_rate: 0.2,
        };
        let expenses = vec![expense(1, "Dining", 250.0, "2024-03-02")];
        let report = build_report(month("2024-03"), &expenses, &settings);
        assert_eq!(report.percentage, Some(100));
        assert_eq!(report.suggested_saving, Some(50));
        assert!(report.summary_text.contains("Reducing dining spending by $50"));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 70 / 80 = 87.5% and 70 * 0.15 = 10.5
        let expenses = vec![
            expense(1, "Books", 10.0, "2024-03-02"),
            expense(2, "Other", 70.0, "2024-03-02"),
        ];
        let report = build_report(month("2024-03"), &expenses, &ReportSettings::default());
        assert_eq!(report.top_category.as_deref(), Some("Other"));
        assert_eq!(report.percentage, Some(88));
        assert_eq!(report.suggested_saving, Some(11));
    }

    #[test]
    fn test_input_not_mutated() {
        let expenses = vec![expense(1, "Food", 10.0, "2024-03-02")];
        let before = format!("{:?}", expenses);
        let _ = build_report(month("2024-03"), &expenses, &ReportSettings::default());
        assert_eq!(format!("{:?}", expenses), before);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(300.0), "300");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.1 + 0.2), "0.3");
        assert_eq!(format_amount(7.05), "7.05");
    }

    #[test]
    fn test_json_shape() {
        let expenses = vec![expense(1, "Food", 10.0, "2024-03-02")];
        let report = build_report(month("2024-03"), &expenses, &ReportSettings::default());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["month"], "2024-03");
        assert_eq!(value["totalSpent"], 10.0);
        assert_eq!(value["topCategory"], "Food");
        assert_eq!(value["lineItems"][0]["index"], 1);
        assert_eq!(value["lineItems"][0]["date"], "2024-03-02");
        assert!(value["summaryText"].is_string());
    }
}
