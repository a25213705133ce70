//! Insight handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use tracing::warn;

use crate::{get_user_email, AppError, AppState};
use spendlens_core::{generate_insight, no_data_insight, InsightResult, Month};

/// GET /api/ai/insights - Budget-aware spending insight for the current month
///
/// Returns 503 with "AI service failed" when the insight service is not
/// configured or cannot answer.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<InsightResult>, AppError> {
    let user_email = get_user_email(&headers);

    let expenses = state.db.list_expenses(&user_email)?;

    let insight = if expenses.is_empty() {
        no_data_insight()
    } else {
        let Some(client) = state.insights.as_ref() else {
            warn!("Insight requested but no insight service is configured");
            return Err(AppError::service_unavailable());
        };
        generate_insight(
            client,
            &state.db,
            &user_email,
            &expenses,
            Month::current(),
            &state.app_config.budget,
        )
        .await?
    };

    // Audit failures are logged, the insight is still returned
    if let Err(e) = state.db.log_audit(
        &user_email,
        "insight",
        Some("expense"),
        None,
        Some(&format!(
            "expenses={}, severity={:?}, budget_usage={:?}",
            expenses.len(),
            insight.severity,
            insight.budget_usage
        )),
    ) {
        warn!(error = %e, user = %user_email, "Failed to record insight audit entry");
    }

    Ok(Json(insight))
}
