//! Budget command implementations

use anyhow::Result;
use spendlens_core::{
    budget_progress, report::format_amount, Budget, BudgetPolicy, BudgetProgress, Database, Month,
    NewBudget, Severity,
};

use super::truncate;

pub fn cmd_budgets_list(
    db: &Database,
    owner: &str,
    month: Option<Month>,
    currency: &str,
) -> Result<()> {
    let budgets = match month {
        Some(month) => db.list_budgets_for_month(owner, month)?,
        None => db.list_budgets(owner)?,
    };

    if budgets.is_empty() {
        println!("No budgets set. Create one with:");
        println!("  spendlens budgets set Food 5000 --month {}", Month::current());
        return Ok(());
    }

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────────────────────────────");

    for budget in budgets {
        println!(
            "   #{:<5} │ {} │ {:<16} │ {:>12}",
            budget.id,
            budget.month,
            truncate(&budget.category, 16),
            format!("{}{}", currency, format_amount(budget.limit))
        );
    }

    Ok(())
}

pub fn cmd_budgets_set(
    db: &Database,
    owner: &str,
    category: &str,
    limit: f64,
    month: Month,
) -> Result<Budget> {
    let budget = db.upsert_budget(
        owner,
        &NewBudget {
            category: category.to_string(),
            limit,
            month,
        },
    )?;
    db.log_audit(
        owner,
        "upsert",
        Some("budget"),
        Some(budget.id),
        Some("via cli"),
    )?;

    println!(
        "✅ Budget #{}: {} limited to {} for {}",
        budget.id,
        budget.category,
        format_amount(budget.limit),
        budget.month
    );
    Ok(budget)
}

pub fn cmd_budgets_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    db.remove_budget(owner, id)?;
    db.log_audit(owner, "delete", Some("budget"), Some(id), Some("via cli"))?;

    println!("🗑️  Deleted budget #{}", id);
    Ok(())
}

pub fn cmd_budgets_progress(
    db: &Database,
    owner: &str,
    month: Month,
    policy: &BudgetPolicy,
    currency: &str,
) -> Result<Vec<BudgetProgress>> {
    let budgets = db.list_budgets_for_month(owner, month)?;
    let expenses = db.list_expenses_for_month(owner, month)?;
    let progress = budget_progress(&budgets, &expenses, policy);

    if progress.is_empty() {
        println!("No budgets set for {}.", month);
        return Ok(progress);
    }

    println!();
    println!("📊 Budget Progress for {}", month);
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &progress {
        let marker = match item.severity {
            Severity::Danger => "🚨",
            Severity::Warning => "⚠️ ",
            Severity::Info => "  ",
        };
        println!(
            "   {} {:<16} │ {:>10} of {:>10} │ {:>4}%",
            marker,
            truncate(&item.category, 16),
            format!("{}{}", currency, format_amount(item.spent)),
            format!("{}{}", currency, format_amount(item.limit)),
            item.usage
        );
    }

    Ok(progress)
}
