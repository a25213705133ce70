//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod health;
pub mod insights;
pub mod reports;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use expenses::*;
pub use health::*;
pub use insights::*;
pub use reports::*;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::AppError;

/// Unwrap a JSON body, reporting malformed input as 400
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
}

/// Parse an optional `YYYY-MM` query value
pub(crate) fn parse_month_param(
    value: Option<&str>,
) -> Result<Option<spendlens_core::Month>, AppError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::bad_request("Invalid month format (use YYYY-MM)")),
    }
}
