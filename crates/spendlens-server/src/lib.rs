//! SpendLens Web Server
//!
//! Axum-based REST API for the SpendLens expense tracker.
//!
//! Security features:
//! - Cloudflare Access header or API key authentication (use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Every API access is recorded in the audit log
//! - Sanitized error responses

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use spendlens_core::{AppConfig, Database, Error as CoreError, InsightBackend, InsightClient};

mod handlers;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Comma-separated API keys accepted as `Authorization: Bearer <key>`
pub const API_KEYS_ENV: &str = "SPENDLENS_API_KEYS";

/// Message returned whenever the insight service cannot produce an insight
pub const INSIGHT_UNAVAILABLE_MESSAGE: &str = "AI service failed";

/// Cloudflare Access header for authenticated user email
const CF_ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

const HEALTH_PATH: &str = "/api/health";

/// How long an insight service reachability result is reused by `/api/health`
pub const REACHABILITY_TTL: Duration = Duration::from_secs(30);

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys for service-to-service access, compared in constant time
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Budget thresholds, report currency and insight service settings
    pub app_config: AppConfig,
    /// None when no insight backend is configured
    pub insights: Option<InsightClient>,
    /// Last insight service reachability result
    pub reachability: ReachabilityCache,
}

/// Caches the outcome of an upstream health check
///
/// The lock is held while checking, so concurrent callers share one check.
#[derive(Default)]
pub struct ReachabilityCache {
    last: tokio::sync::Mutex<Option<(Instant, bool)>>,
}

impl ReachabilityCache {
    /// Return the cached result if younger than `ttl`, otherwise run `check`
    pub async fn get_or_check<F, Fut>(&self, ttl: Duration, check: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut last = self.last.lock().await;
        if let Some((checked_at, reachable)) = *last {
            if checked_at.elapsed() < ttl {
                return reachable;
            }
        }

        let reachable = check().await;
        *last = Some((Instant::now(), reachable));
        reachable
    }
}

/// Authentication middleware
///
/// Accepts the Cloudflare Access user header (trusted behind a Cloudflare
/// Tunnel, which rewrites it) or a configured API key. API keys are compared
/// in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // Liveness stays reachable without credentials
    if !state.config.require_auth || request.uri().path() == HEALTH_PATH {
        return next.run(request).await;
    }

    let cf_user = request
        .headers()
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(email) = cf_user {
        info!(user = %email, path = %request.uri().path(), "Authenticated via Cloudflare Access header");
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "message": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys in constant time
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Parse a comma-separated list of API keys, skipping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Identity that owns the request's expenses and budgets
///
/// Returns the Cloudflare Access email, "api-key" for API key auth, or
/// "local-dev" when unauthenticated.
pub fn get_user_email(headers: &axum::http::HeaderMap) -> String {
    if let Some(email) = headers
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return email.to_string();
    }

    if headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .is_some()
    {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Confirmation body for deletes
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Create the application router
///
/// Configuration and the insight client come from the layered config.
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let app_config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    create_router_from_config(db, config, app_config)
}

/// Create the application router from an already resolved configuration
///
/// The insight client is built from `app_config.insights`.
pub fn create_router_from_config(db: Database, config: ServerConfig, app_config: AppConfig) -> Router {
    let insights = InsightClient::from_config(&app_config.insights);
    create_router_with_options(db, config, app_config, insights)
}

/// Create the application router with explicit configuration (for testing)
pub fn create_router_with_options(
    db: Database,
    config: ServerConfig,
    app_config: AppConfig,
    insights: Option<InsightClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        app_config,
        insights,
        reachability: ReachabilityCache::default(),
    });

    let api_routes = Router::new()
        // Auth
        .route("/me", get(handlers::get_me))
        // Expenses
        .route("/expense/add", post(handlers::add_expense))
        .route("/expense/all", get(handlers::list_expenses))
        .route("/expense/:id", delete(handlers::delete_expense))
        // Budgets
        .route("/budget/set", post(handlers::set_budget))
        .route("/budget/all", get(handlers::list_budgets))
        .route("/budget/progress", get(handlers::get_budget_progress))
        .route("/budget/:id", delete(handlers::delete_budget))
        // Insights
        .route("/ai/insights", get(handlers::get_insights))
        // Reports
        .route("/report/summary", get(handlers::report_summary))
        .route("/report/export", get(handlers::export_report))
        // Audit log
        .route("/audit", get(handlers::list_audit_log))
        // Health
        .route("/health", get(handlers::health));

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server with the default configuration locations
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    let app_config = AppConfig::load()?;
    serve_with_config(db, host, port, ServerConfig::default(), app_config).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
    app_config: AppConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    check_insight_connection(&app_config).await;

    let app = create_router_from_config(db, config, app_config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log insight service status
async fn check_insight_connection(app_config: &AppConfig) {
    match InsightClient::from_config(&app_config.insights) {
        Some(client) => {
            if client.health_check().await {
                info!("✅ Insight service connected: {}", client.host());
            } else {
                warn!(
                    "⚠️  Insight service configured but not responding: {}",
                    client.host()
                );
            }
        }
        None => {
            info!("ℹ️  Insight service not configured (set INSIGHT_SERVICE_URL to enable AI insights)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: INSIGHT_UNAVAILABLE_MESSAGE.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "message": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&msg),
            CoreError::UpstreamUnavailable(detail) => {
                warn!(error = %detail, "Insight service unavailable");
                Self::service_unavailable()
            }
            CoreError::Render(_) => Self {
                internal: Some(err.into()),
                ..Self::internal("Failed to generate report")
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                internal: Some(other.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests;
