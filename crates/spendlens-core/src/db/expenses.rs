//! Expense operations

use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{parse_date, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Expense, Month, NewExpense};

const EXPENSE_COLUMNS: &str = "id, owner, category, amount, date, description, created_at";

fn row_to_expense(row: &Row) -> rusqlite::Result<Expense> {
    let date_str: String = row.get(4)?;
    let created_at_str: String = row.get(6)?;
    Ok(Expense {
        id: row.get(0)?,
        owner: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        date: parse_date(4, &date_str)?,
        description: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Record an expense for `owner`
    pub fn insert_expense(&self, owner: &str, expense: &NewExpense) -> Result<i64> {
        expense.validate()?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO expenses (owner, category, amount, date, description) VALUES (?, ?, ?, ?, ?)",
            params![
                owner,
                expense.category.trim(),
                expense.amount,
                expense.date.format("%Y-%m-%d").to_string(),
                expense.description,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// All expenses for `owner`, newest first
    pub fn list_expenses(&self, owner: &str) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE owner = ? ORDER BY date DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;

        let expenses = stmt
            .query_map(params![owner], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Expenses with `from <= date < to`, oldest first
    pub fn list_expenses_in_range(
        &self,
        owner: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE owner = ? AND date >= ? AND date < ? ORDER BY date ASC, id ASC",
            EXPENSE_COLUMNS
        ))?;

        let expenses = stmt
            .query_map(
                params![
                    owner,
                    from.format("%Y-%m-%d").to_string(),
                    to_exclusive.format("%Y-%m-%d").to_string(),
                ],
                row_to_expense,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Expenses dated inside `month`
    pub fn list_expenses_for_month(&self, owner: &str, month: Month) -> Result<Vec<Expense>> {
        self.list_expenses_in_range(owner, month.first_day(), month.next_month_start())
    }

    /// Get an expense by ID, scoped to its owner
    pub fn get_expense(&self, owner: &str, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE owner = ? AND id = ?",
            EXPENSE_COLUMNS
        ))?;

        let mut rows = stmt.query_map(params![owner, id], row_to_expense)?;
        let expense = rows.next().transpose()?;
        Ok(expense)
    }

    /// Delete an expense; returns false when nothing matched
    pub fn delete_expense(&self, owner: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE owner = ? AND id = ?",
            params![owner, id],
        )?;
        Ok(deleted > 0)
    }
}
