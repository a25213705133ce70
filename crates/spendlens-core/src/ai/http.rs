//! HTTP insight backend
//!
//! Posts the expense snapshot to `{base}/insights`. Each attempt is bounded by
//! the policy timeout; transport errors, timeouts and 5xx responses are retried
//! after a fixed backoff. 4xx responses and unusable bodies fail immediately.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::InsightServiceConfig;
use crate::error::{Error, Result};
use crate::insights::InsightResult;

use super::types::{InsightRequest, RetryPolicy};
use super::InsightBackend;

/// Outcome of a single failed attempt
enum AttemptError {
    Retryable(String),
    Fatal(String),
}

/// Client for a remote insight service
#[derive(Clone)]
pub struct HttpInsightBackend {
    http_client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl HttpInsightBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_policy(base_url, RetryPolicy::default())
    }

    pub fn with_policy(base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Build from config; None when no URL is configured
    pub fn from_config(config: &InsightServiceConfig) -> Option<Self> {
        let url = config.url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(Self::with_policy(url.trim(), config.retry_policy()))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn attempt(&self, request: &InsightRequest) -> std::result::Result<InsightResult, AttemptError> {
        let response = self
            .http_client
            .post(format!("{}/insights", self.base_url))
            .timeout(self.policy.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(describe_transport_error(&e)))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Retryable(format!("insight service returned {}", status)));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(format!("insight service returned {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Retryable(describe_transport_error(&e)))?;

        serde_json::from_slice::<InsightResult>(&body)
            .map_err(|e| AttemptError::Fatal(format!("unusable insight response: {}", e)))
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "insight service timed out".to_string()
    } else if e.is_connect() {
        format!("cannot reach insight service: {}", e)
    } else {
        format!("insight request failed: {}", e)
    }
}

#[async_trait]
impl InsightBackend for HttpInsightBackend {
    async fn generate(&self, request: &InsightRequest) -> Result<InsightResult> {
        let attempts = self.policy.attempts();
        let mut last_error = String::from("insight service not called");

        for attempt in 1..=attempts {
            debug!(
                url = %self.base_url,
                attempt,
                expenses = request.expenses.len(),
                "Requesting insights"
            );

            match self.attempt(request).await {
                Ok(insight) => return Ok(insight),
                Err(AttemptError::Fatal(message)) => {
                    warn!(url = %self.base_url, error = %message, "Insight service failed");
                    return Err(Error::UpstreamUnavailable(message));
                }
                Err(AttemptError::Retryable(message)) => {
                    warn!(
                        url = %self.base_url,
                        attempt,
                        attempts,
                        error = %message,
                        "Insight service call failed"
                    );
                    last_error = message;
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        Err(Error::UpstreamUnavailable(last_error))
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/health", self.base_url))
            .timeout(self.policy.timeout)
            .send()
            .await
        {
            Ok(resp) => !resp.status().is_server_error(),
            Err(_) => false,
        }
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
