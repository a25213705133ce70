//! Mock insight backend
//!
//! Computes insights locally with the same response shape as the insight
//! service (top category, share percentage, saving tip, auto-budget, weekly
//! trend, anomaly and forecast). Useful for tests and for development
//! without a running service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::insights::{InsightResult, Severity};
use crate::report::{format_amount, rank_categories};

use super::types::InsightRequest;
use super::InsightBackend;

/// Mock insight backend
#[derive(Clone, Debug)]
pub struct MockInsightBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether generate should fail with `UpstreamUnavailable`
    pub failing: bool,
    /// Reference day for weekly comparisons (defaults to today, UTC)
    pub today: Option<NaiveDate>,
}

impl Default for MockInsightBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInsightBackend {
    /// Create a healthy mock backend
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
            today: None,
        }
    }

    /// A backend that is down: unhealthy and every request fails
    pub fn failing() -> Self {
        Self {
            healthy: false,
            failing: true,
            today: None,
        }
    }

    /// Pin the reference day used for the weekly trend
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[async_trait]
impl InsightBackend for MockInsightBackend {
    async fn generate(&self, request: &InsightRequest) -> Result<InsightResult> {
        if self.failing {
            return Err(Error::UpstreamUnavailable(
                "mock insight backend configured to fail".to_string(),
            ));
        }
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        Ok(compute_insight(request, today))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn host(&self) -> &str {
        "mock"
    }
}

struct DatedAmount {
    category: String,
    amount: f64,
    date: Option<NaiveDate>,
}

fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    s.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn round_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Build an insight the way the insight service does
pub fn compute_insight(request: &InsightRequest, today: NaiveDate) -> InsightResult {
    if request.is_empty() {
        let mut insight = InsightResult::new(
            "No insights yet",
            "Start adding expenses to get smart insights.",
        )
        .with_severity(Severity::Info);
        insight.extra.insert("recommendations".into(), json!([]));
        insight.extra.insert("popup".into(), Value::Null);
        return insight;
    }

    let expenses: Vec<DatedAmount> = request
        .expenses
        .iter()
        .map(|e| DatedAmount {
            category: e.category.clone(),
            amount: e.amount,
            date: parse_wire_date(&e.date),
        })
        .collect();

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
    for e in &expenses {
        *category_totals.entry(e.category.clone()).or_insert(0.0) += e.amount;
    }

    let ranked = rank_categories(&category_totals);
    let (top_category, top_amount) = match ranked.first() {
        Some((category, amount)) => (category.to_string(), *amount),
        None => (String::new(), 0.0),
    };
    let percentage = if total > 0.0 {
        round_i64(top_amount / total * 100.0)
    } else {
        0
    };

    let weekly_trend = weekly_trend(&expenses, today);
    let suggested_saving = round_i64(top_amount * 0.15);

    let mut recommendations = vec![json!({
        "icon": "💡",
        "title": "Reduce top expense",
        "text": format!(
            "Reducing {} spending by ₹{} could improve savings.",
            top_category.to_lowercase(),
            suggested_saving
        ),
    })];
    if percentage >= 50 {
        recommendations.push(json!({
            "icon": "⚠️",
            "title": "High spending alert",
            "text": format!(
                "{} alone takes {}% of your budget. Set a strict limit.",
                top_category, percentage
            ),
        }));
    }
    if weekly_trend
        .as_ref()
        .and_then(|t| t.get("direction"))
        .and_then(Value::as_str)
        == Some("up")
    {
        recommendations.push(json!({
            "icon": "📈",
            "title": "Spending increased",
            "text": "Your weekly spending has increased. Review recent transactions.",
        }));
    }
    if total >= 5000.0 {
        recommendations.push(json!({
            "icon": "📊",
            "title": "Monthly review",
            "text": "Your expenses are high this month. Try setting daily limits.",
        }));
    }

    let popup = if percentage >= 80 {
        let kind = if percentage >= 100 { "danger" } else { "warning" };
        json!({
            "type": kind,
            "message": format!(
                "You used {}% of your spending on {}. Control expenses to avoid overspending.",
                percentage, top_category
            ),
        })
    } else {
        Value::Null
    };

    let forecast = forecast(&expenses);
    if let Some(forecast) = &forecast {
        recommendations.push(json!({
            "icon": "🔮",
            "title": "Next Month Forecast",
            "text": forecast["message"].clone(),
        }));
    }

    let severity = if percentage >= 60 {
        "danger"
    } else if percentage >= 40 {
        "warning"
    } else {
        "good"
    };

    let mut insight = InsightResult::new(
        format!("{} is your top expense", top_category),
        format!(
            "{} accounts for {}% of your spending.\n\nYou spent ₹{} on this category.",
            top_category,
            percentage,
            format_amount(top_amount)
        ),
    )
    .with_percentage(percentage)
    .with_top_category(top_category.clone());
    insight.severity = Some(severity.to_string());

    insight.extra.insert(
        "savingTip".into(),
        json!(format!(
            "If you reduce {} spending by ₹{}, you could save more this month.",
            top_category.to_lowercase(),
            suggested_saving
        )),
    );
    insight
        .extra
        .insert("weeklyTrend".into(), weekly_trend.unwrap_or(Value::Null));
    insight.extra.insert(
        "autoBudget".into(),
        json!({
            "category": top_category,
            "suggested": round_i64(top_amount * 0.9),
            "reason": "Based on your recent spending pattern",
        }),
    );
    insight
        .extra
        .insert("recommendations".into(), Value::Array(recommendations));
    insight.extra.insert("popup".into(), popup);
    if let Some(anomaly) = anomaly(&expenses) {
        insight.extra.insert("anomaly".into(), anomaly);
    }
    if let Some(forecast) = forecast {
        insight.extra.insert("forecast".into(), forecast);
    }

    insight
}

/// Last 7 days against the 7 days before that
fn weekly_trend(expenses: &[DatedAmount], today: NaiveDate) -> Option<Value> {
    let last_7 = today - Duration::days(7);
    let prev_7 = today - Duration::days(14);

    let mut this_week = 0.0;
    let mut last_week = 0.0;
    for e in expenses {
        let Some(date) = e.date else { continue };
        if date >= last_7 {
            this_week += e.amount;
        } else if date >= prev_7 {
            last_week += e.amount;
        }
    }

    if last_week <= 0.0 {
        return None;
    }
    let diff = round_i64(this_week - last_week);
    let direction = if diff > 0 { "up" } else { "down" };
    Some(json!({
        "change": diff.abs(),
        "direction": direction,
    }))
}

/// Spike when the last 3 spending days average 1.8x the 7 before them
fn anomaly(expenses: &[DatedAmount]) -> Option<Value> {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for e in expenses {
        if let Some(date) = e.date {
            *daily.entry(date).or_insert(0.0) += e.amount;
        }
    }
    if daily.len() < 8 {
        return None;
    }

    let days: Vec<f64> = daily.values().rev().copied().collect();
    let last_3_avg = days.iter().take(3).sum::<f64>() / 3.0;
    let prev_7_avg = days.iter().skip(3).take(7).sum::<f64>() / 7.0;

    if prev_7_avg > 0.0 && last_3_avg >= prev_7_avg * 1.8 {
        let ratio = (last_3_avg / prev_7_avg * 10.0).round() / 10.0;
        Some(json!({
            "type": "spike",
            "severity": "danger",
            "message": format!(
                "Unusual spending spike detected. Recent spending is {:.1}× higher than normal.",
                ratio
            ),
        }))
    } else {
        None
    }
}

/// Project next month from the growth between the last two months
fn forecast(expenses: &[DatedAmount]) -> Option<Value> {
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for e in expenses {
        if let Some(date) = e.date {
            *monthly.entry(date.format("%Y-%m").to_string()).or_insert(0.0) += e.amount;
        }
    }
    if monthly.len() < 2 {
        return None;
    }

    let mut recent = monthly.values().rev();
    let last_month = *recent.next()?;
    let prev_month = *recent.next()?;

    let growth_rate = if prev_month > 0.0 {
        (last_month - prev_month) / prev_month
    } else {
        0.0
    };
    let predicted = round_i64(last_month * (1.0 + growth_rate));
    let trend = if growth_rate > 0.0 { "up" } else { "down" };

    Some(json!({
        "nextMonthEstimate": predicted,
        "trend": trend,
        "message": format!(
            "If you continue this trend, you may spend around ₹{} next month.",
            predicted
        ),
    }))
}
