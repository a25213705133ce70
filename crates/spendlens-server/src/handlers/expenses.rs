//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::json_body;
use crate::{get_user_email, AppError, AppState, MessageResponse};
use spendlens_core::{Expense, NewExpense};

/// Request body for adding an expense
#[derive(Debug, Deserialize)]
pub struct AddExpenseRequest {
    pub category: String,
    pub amount: f64,
    /// Defaults to today (UTC)
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// POST /api/expense/add - Record an expense
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AddExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let user_email = get_user_email(&headers);
    let req = json_body(payload)?;

    let new_expense = NewExpense {
        category: req.category,
        amount: req.amount,
        date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
        description: req.description.filter(|d| !d.trim().is_empty()),
    };

    let id = state.db.insert_expense(&user_email, &new_expense)?;
    let expense = state
        .db
        .get_expense(&user_email, id)?
        .ok_or_else(|| AppError::internal("Expense vanished after insert"))?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("expense"),
        Some(id),
        Some(&format!(
            "category={}, amount={}, date={}",
            expense.category, expense.amount, expense.date
        )),
    )?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expense/all - List the caller's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user_email = get_user_email(&headers);

    let expenses = state.db.list_expenses(&user_email)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("expense"),
        None,
        Some(&format!("count={}", expenses.len())),
    )?;

    Ok(Json(expenses))
}

/// DELETE /api/expense/:id - Delete one of the caller's expenses
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_email = get_user_email(&headers);

    if !state.db.delete_expense(&user_email, id)? {
        return Err(AppError::not_found("Expense not found"));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("expense"), Some(id), None)?;

    Ok(Json(MessageResponse::new("Expense deleted")))
}
