//! Insight service client
//!
//! Spending insights are computed by an external service. This module hides
//! where they come from:
//!
//! - `InsightBackend` trait: the interface every backend implements
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backends: `HttpInsightBackend` (remote service), `MockInsightBackend` (local)
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = InsightClient::from_env();
//!
//! if let Some(ref client) = client {
//!     let insight = client.generate(&InsightRequest::from_expenses(&expenses)).await?;
//!     println!("{}", insight.title);
//! }
//! ```
//!
//! # Configuration
//!
//! See [`crate::config`]. `INSIGHT_BACKEND` selects `http` (default, needs
//! `INSIGHT_SERVICE_URL`) or `mock`.

mod http;
mod mock;
pub mod types;

pub use http::HttpInsightBackend;
pub use mock::{compute_insight, MockInsightBackend};
pub use types::{AiExpense, InsightRequest, RetryPolicy};

use async_trait::async_trait;

use crate::config::{AppConfig, InsightServiceConfig};
use crate::error::Result;
use crate::insights::InsightResult;

/// Interface for insight backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Produce an insight for one expense snapshot
    ///
    /// Failures of the service itself surface as `Error::UpstreamUnavailable`.
    async fn generate(&self, request: &InsightRequest) -> Result<InsightResult>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Where insights come from (URL or `mock`)
    fn host(&self) -> &str;
}

/// Concrete insight client
#[derive(Clone)]
pub enum InsightClient {
    /// Remote insight service over HTTP
    Http(HttpInsightBackend),
    /// Locally computed insights
    Mock(MockInsightBackend),
}

impl InsightClient {
    /// Create a client from the layered configuration
    ///
    /// Returns None when the HTTP backend is selected but no URL is set.
    pub fn from_env() -> Option<Self> {
        match AppConfig::load() {
            Ok(config) => Self::from_config(&config.insights),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, insight client disabled");
                None
            }
        }
    }

    pub fn from_config(config: &InsightServiceConfig) -> Option<Self> {
        match config.backend.to_lowercase().as_str() {
            "mock" => Some(Self::mock()),
            "http" => HttpInsightBackend::from_config(config).map(Self::Http),
            other => {
                tracing::warn!(backend = %other, "Unknown INSIGHT_BACKEND, falling back to http");
                HttpInsightBackend::from_config(config).map(Self::Http)
            }
        }
    }

    /// Create an HTTP client with the default retry policy
    pub fn http(base_url: &str) -> Self {
        Self::Http(HttpInsightBackend::new(base_url))
    }

    pub fn mock() -> Self {
        Self::Mock(MockInsightBackend::new())
    }
}

#[async_trait]
impl InsightBackend for InsightClient {
    async fn generate(&self, request: &InsightRequest) -> Result<InsightResult> {
        match self {
            Self::Http(b) => b.generate(request).await,
            Self::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Self::Http(b) => b.health_check().await,
            Self::Mock(b) => b.health_check().await,
        }
    }

    fn host(&self) -> &str {
        match self {
            Self::Http(b) => b.host(),
            Self::Mock(b) => b.host(),
        }
    }
}
