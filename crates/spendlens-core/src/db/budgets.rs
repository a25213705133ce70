//! Budget operations

use rusqlite::{params, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, Month, NewBudget};

const BUDGET_COLUMNS: &str = "id, owner, category, limit_amount, month, created_at, updated_at";

fn row_to_budget(row: &Row) -> rusqlite::Result<Budget> {
    let month_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;
    let month = month_str.parse::<Month>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        owner: row.get(1)?,
        category: row.get(2)?,
        limit: row.get(3)?,
        month,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    /// Set the budget for (owner, category, month), replacing any existing limit
    pub fn upsert_budget(&self, owner: &str, budget: &NewBudget) -> Result<Budget> {
        budget.validate()?;
        let conn = self.conn()?;
        let category = budget.category.trim();
        let month = budget.month.to_string();

        conn.execute(
            r#"
            INSERT INTO budgets (owner, category, limit_amount, month)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(owner, category, month) DO UPDATE SET
                limit_amount = excluded.limit_amount,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![owner, category, budget.limit, month],
        )?;

        let saved = conn.query_row(
            &format!(
                "SELECT {} FROM budgets WHERE owner = ? AND category = ? AND month = ?",
                BUDGET_COLUMNS
            ),
            params![owner, category, month],
            row_to_budget,
        )?;

        Ok(saved)
    }

    /// All budgets for `owner`, newest month first
    pub fn list_budgets(&self, owner: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE owner = ? ORDER BY month DESC, category ASC",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![owner], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    pub fn list_budgets_for_month(&self, owner: &str, month: Month) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE owner = ? AND month = ? ORDER BY category ASC",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![owner, month.to_string()], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Budget for one category in one month, if configured
    pub fn get_budget_for(
        &self,
        owner: &str,
        category: &str,
        month: Month,
    ) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE owner = ? AND category = ? AND month = ?",
            BUDGET_COLUMNS
        ))?;

        let mut rows = stmt.query_map(params![owner, category, month.to_string()], row_to_budget)?;
        let budget = rows.next().transpose()?;
        Ok(budget)
    }

    /// Delete a budget owned by `owner`
    pub fn delete_budget(&self, owner: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE owner = ? AND id = ?",
            params![owner, id],
        )?;
        Ok(deleted > 0)
    }

    /// Delete a budget, reporting a missing row as `NotFound`
    pub fn remove_budget(&self, owner: &str, id: i64) -> Result<()> {
        if self.delete_budget(owner, id)? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("Budget {} not found", id)))
        }
    }
}
