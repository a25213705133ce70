//! Insight command implementation

use anyhow::{Context, Result};
use spendlens_core::{
    generate_insight, no_data_insight, BudgetPolicy, Database, InsightBackend, InsightClient,
    InsightResult, Month,
};

/// Produce and print the insight for `owner`'s expenses
///
/// Budgets are looked up for `month`.
pub async fn cmd_insights(
    db: &Database,
    owner: &str,
    client: Option<&InsightClient>,
    month: Month,
    policy: &BudgetPolicy,
    json: bool,
) -> Result<InsightResult> {
    let expenses = db.list_expenses(owner)?;

    let insight = if expenses.is_empty() {
        no_data_insight()
    } else {
        let client = client.context(
            "Insight service not configured (set INSIGHT_SERVICE_URL or INSIGHT_BACKEND=mock)",
        )?;
        tracing::debug!(host = client.host(), expenses = expenses.len(), "Requesting insight");
        generate_insight(client, db, owner, &expenses, month, policy)
            .await
            .context("AI service failed")?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(insight);
    }

    let icon = match insight.severity.as_deref() {
        Some("danger") => "🚨",
        Some("warning") => "⚠️ ",
        _ => "💡",
    };
    println!();
    println!("{} {}", icon, insight.title);
    println!("   ─────────────────────────────────────────────────────────────");
    for line in insight.message.lines() {
        println!("   {}", line);
    }
    if let Some(usage) = insight.budget_usage {
        println!();
        println!("   Budget used: {}%", usage);
    }

    Ok(insight)
}
