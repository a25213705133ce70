//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, REACHABILITY_TTL};
use spendlens_core::InsightBackend;

#[derive(Debug, Serialize)]
pub struct InsightServiceStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub insights: InsightServiceStatus,
}

/// GET /api/health - Liveness and insight service reachability
///
/// Always answers 200; a down dependency is reported in the body. The upstream
/// check result is reused for `REACHABILITY_TTL`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.conn().is_ok();

    let insights = match &state.insights {
        Some(client) => InsightServiceStatus {
            configured: true,
            host: Some(client.host().to_string()),
            reachable: state
                .reachability
                .get_or_check(REACHABILITY_TTL, || client.health_check())
                .await,
        },
        None => InsightServiceStatus {
            configured: false,
            host: None,
            reachable: false,
        },
    };

    Json(HealthResponse {
        status: "ok",
        database,
        insights,
    })
}
