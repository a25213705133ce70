//! Report handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Response, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::parse_month_param;
use crate::{get_user_email, AppError, AppState};
use spendlens_core::{build_report, render_report, Month, ReportFormat, ReportSummary};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Required, `YYYY-MM`
    pub month: Option<String>,
    /// pdf (default), csv, json or text
    pub format: Option<String>,
}

fn required_month(params: &ReportQuery) -> Result<Month, AppError> {
    parse_month_param(params.month.as_deref())?
        .ok_or_else(|| AppError::bad_request("Month is required"))
}

/// Build the report for the caller's expenses in `month`
fn load_report(state: &AppState, owner: &str, month: Month) -> Result<ReportSummary, AppError> {
    let expenses = state.db.list_expenses_for_month(owner, month)?;
    Ok(build_report(month, &expenses, &state.app_config.report))
}

/// GET /api/report/summary - Monthly report as JSON
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportSummary>, AppError> {
    let user_email = get_user_email(&headers);
    let month = required_month(&params)?;

    let report = load_report(&state, &user_email, month)?;

    state.db.log_audit(
        &user_email,
        "report",
        Some("monthly_summary"),
        None,
        Some(&format!(
            "month={}, items={}, total={}",
            month,
            report.line_items.len(),
            report.total_spent
        )),
    )?;

    Ok(Json(report))
}

/// GET /api/report/export - Download the monthly report
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ReportQuery>,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(&headers);
    let month = required_month(&params)?;

    let format = match params.format.as_deref().map(str::trim) {
        None | Some("") => ReportFormat::default(),
        Some(s) => s.parse::<ReportFormat>().map_err(|_| {
            AppError::bad_request("Invalid format (use pdf, csv, json or text)")
        })?,
    };

    let report = load_report(&state, &user_email, month)?;
    // Rendered fully before any byte is sent
    let bytes = render_report(&report, format)?;
    let file_name = format.file_name(month);

    state.db.log_audit(
        &user_email,
        "export",
        Some("monthly_report"),
        None,
        Some(&format!(
            "month={}, format={}, items={}",
            month,
            format,
            report.line_items.len()
        )),
    )?;

    info!(month = %month, format = %format, bytes = bytes.len(), "Exported report");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(bytes))
        .map_err(|_| AppError::internal("Failed to build response"))
}
