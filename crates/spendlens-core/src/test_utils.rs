//! Test utilities for spendlens-core
//!
//! Provides a mock insight service that answers `POST /insights` the way the
//! real service does, with switchable failure modes for exercising timeouts,
//! retries and unusable responses.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tokio::sync::oneshot;

use crate::ai::{compute_insight, InsightRequest};

/// How the mock service responds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Insight computed from the request, including `topCategory`
    Normal,
    /// Like `Normal` but without `topCategory` (only `autoBudget.category`)
    NoTopCategory,
    /// Every request answers 503
    Failing,
    /// 200 with a body that is not an insight
    Malformed,
    /// Waits before answering normally
    Slow(Duration),
    /// First request answers 503, later ones are normal
    FlakyOnce,
}

#[derive(Clone)]
struct MockState {
    mode: MockMode,
    requests: Arc<AtomicUsize>,
    health_checks: Arc<AtomicUsize>,
}

/// Mock insight service for tests and development
pub struct MockInsightServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    health_checks: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockInsightServer {
    /// Start the mock server on an available port
    pub async fn start(mode: MockMode) -> Self {
        let requests = Arc::new(AtomicUsize::new(0));
        let health_checks = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            mode,
            requests: requests.clone(),
            health_checks: health_checks.clone(),
        };

        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/insights", post(handle_insights))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            health_checks,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `POST /insights` requests received
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of `GET /health` requests received
    pub fn health_check_count(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockInsightServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health(State(state): State<MockState>) -> &'static str {
    state.health_checks.fetch_add(1, Ordering::SeqCst);
    "ok"
}

async fn handle_insights(
    State(state): State<MockState>,
    Json(request): Json<InsightRequest>,
) -> Response {
    let seen = state.requests.fetch_add(1, Ordering::SeqCst);
    let today = Utc::now().date_naive();

    match state.mode {
        MockMode::Normal => Json(compute_insight(&request, today)).into_response(),
        MockMode::NoTopCategory => {
            let mut insight = compute_insight(&request, today);
            insight.top_category = None;
            Json(insight).into_response()
        }
        MockMode::Failing => {
            (StatusCode::SERVICE_UNAVAILABLE, "model overloaded").into_response()
        }
        MockMode::Malformed => (StatusCode::OK, "<html>gateway error</html>").into_response(),
        MockMode::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(compute_insight(&request, today)).into_response()
        }
        MockMode::FlakyOnce if seen == 0 => {
            (StatusCode::SERVICE_UNAVAILABLE, "warming up").into_response()
        }
        MockMode::FlakyOnce => Json(compute_insight(&request, today)).into_response(),
    }
}
