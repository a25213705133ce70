//! Expense command implementations

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use spendlens_core::{report::format_amount, Database, NewExpense};

use super::truncate;

pub fn cmd_expenses_list(db: &Database, owner: &str, limit: usize, currency: &str) -> Result<()> {
    let expenses = db.list_expenses(owner)?;

    if expenses.is_empty() {
        println!("No expenses recorded. Add one with:");
        println!("  spendlens expenses add Food 250");
        return Ok(());
    }

    println!();
    println!("📝 Recent Expenses ({} total)", expenses.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses.iter().take(limit) {
        println!(
            "   #{:<5} │ {} │ {:>12} │ {:<16} │ {}",
            expense.id,
            expense.date,
            format!("{}{}", currency, format_amount(expense.amount)),
            truncate(&expense.category, 16),
            truncate(expense.description.as_deref().unwrap_or(""), 30)
        );
    }

    Ok(())
}

/// Record an expense and return its ID
pub fn cmd_expenses_add(
    db: &Database,
    owner: &str,
    category: &str,
    amount: f64,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<i64> {
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))?,
        None => Utc::now().date_naive(),
    };

    let id = db.insert_expense(
        owner,
        &NewExpense {
            category: category.to_string(),
            amount,
            date,
            description: description.map(str::to_string),
        },
    )?;
    db.log_audit(owner, "create", Some("expense"), Some(id), Some("via cli"))?;

    println!("✅ Recorded expense #{}: {} {} on {}", id, category.trim(), amount, date);
    Ok(id)
}

pub fn cmd_expenses_delete(db: &Database, owner: &str, id: i64) -> Result<()> {
    if !db.delete_expense(owner, id)? {
        anyhow::bail!("Expense {} not found", id);
    }
    db.log_audit(owner, "delete", Some("expense"), Some(id), Some("via cli"))?;

    println!("🗑️  Deleted expense #{}", id);
    Ok(())
}
