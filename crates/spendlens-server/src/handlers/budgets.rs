//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::{json_body, parse_month_param};
use crate::{get_user_email, AppError, AppState, MessageResponse};
use spendlens_core::{budget_progress, Budget, BudgetProgress, Month, NewBudget};

/// Request body for setting a budget
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub category: String,
    pub limit: f64,
    /// `YYYY-MM`
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub struct BudgetMonthQuery {
    pub month: Option<String>,
}

/// POST /api/budget/set - Create or replace the limit for (category, month)
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SetBudgetRequest>, JsonRejection>,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(&headers);
    let req = json_body(payload)?;

    let month = parse_month_param(Some(&req.month))?
        .ok_or_else(|| AppError::bad_request("Month is required"))?;

    let budget = state.db.upsert_budget(
        &user_email,
        &NewBudget {
            category: req.category,
            limit: req.limit,
            month,
        },
    )?;

    state.db.log_audit(
        &user_email,
        "upsert",
        Some("budget"),
        Some(budget.id),
        Some(&format!(
            "category={}, limit={}, month={}",
            budget.category, budget.limit, budget.month
        )),
    )?;

    Ok(Json(budget))
}

/// GET /api/budget/all - List budgets, optionally for one month
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<BudgetMonthQuery>,
) -> Result<Json<Vec<Budget>>, AppError> {
    let user_email = get_user_email(&headers);

    let month = parse_month_param(params.month.as_deref())?;
    let budgets = match month {
        Some(month) => state.db.list_budgets_for_month(&user_email, month)?,
        None => state.db.list_budgets(&user_email)?,
    };

    state.db.log_audit(
        &user_email,
        "list",
        Some("budget"),
        None,
        Some(&format!("month={:?}, count={}", month, budgets.len())),
    )?;

    Ok(Json(budgets))
}

/// GET /api/budget/progress - Spending against each budget of a month
///
/// Defaults to the current month.
pub async fn get_budget_progress(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<BudgetMonthQuery>,
) -> Result<Json<Vec<BudgetProgress>>, AppError> {
    let user_email = get_user_email(&headers);

    let month = parse_month_param(params.month.as_deref())?.unwrap_or_else(Month::current);
    let budgets = state.db.list_budgets_for_month(&user_email, month)?;
    let expenses = state.db.list_expenses_for_month(&user_email, month)?;
    let progress = budget_progress(&budgets, &expenses, &state.app_config.budget);

    state.db.log_audit(
        &user_email,
        "report",
        Some("budget_progress"),
        None,
        Some(&format!("month={}, budgets={}", month, progress.len())),
    )?;

    Ok(Json(progress))
}

/// DELETE /api/budget/:id - Delete one of the caller's budgets
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.remove_budget(&user_email, id)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("budget"), Some(id), None)?;

    Ok(Json(MessageResponse::new("Budget deleted")))
}
