//! Layered configuration
//!
//! Resolution order (later wins):
//! 1. Embedded defaults (`config/spendlens.toml`, compiled into the binary)
//! 2. Override file (`~/.local/share/spendlens/config.toml` or an explicit path)
//! 3. Environment variables

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai::RetryPolicy;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendlens.toml");

pub const INSIGHT_SERVICE_URL_ENV: &str = "INSIGHT_SERVICE_URL";
pub const INSIGHT_BACKEND_ENV: &str = "INSIGHT_BACKEND";
pub const INSIGHT_TIMEOUT_ENV: &str = "INSIGHT_TIMEOUT_SECS";
pub const INSIGHT_MAX_RETRIES_ENV: &str = "INSIGHT_MAX_RETRIES";
pub const INSIGHT_BACKOFF_ENV: &str = "INSIGHT_RETRY_BACKOFF_MS";
pub const CURRENCY_ENV: &str = "SPENDLENS_CURRENCY";

/// Insight service connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct InsightServiceConfig {
    /// `http` or `mock`
    pub backend: String,
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for InsightServiceConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            url: None,
            timeout_secs: 10,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl InsightServiceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Budget usage thresholds (integer percent of the limit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPolicy {
    pub warning_threshold: i64,
    pub danger_threshold: i64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            warning_threshold: 80,
            danger_threshold: 100,
        }
    }
}

/// Report presentation settings
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub currency: String,
    pub saving_rate: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency: "₹".to_string(),
            saving_rate: 0.15,
        }
    }
}

/// Fully resolved application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub insights: InsightServiceConfig,
    pub budget: BudgetPolicy,
    pub report: ReportSettings,
}

impl AppConfig {
    /// Load defaults, the user override file, and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit override file instead of the default location
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(override_path, |key| std::env::var(key).ok())
    }

    fn load_with_env<F>(override_path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_toml_str(DEFAULT_CONFIG)?;

        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);
        if let Some(path) = path.filter(|p| p.exists()) {
            debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            config.merge_toml(&content)?;
        }

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Parse TOML on top of built-in defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(content)?;
        Ok(config)
    }

    /// Overlay the keys present in `content`
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(insights) = raw.insights {
            if let Some(backend) = insights.backend {
                self.insights.backend = backend;
            }
            if let Some(url) = insights.url {
                self.insights.url = Some(url);
            }
            if let Some(timeout) = insights.timeout_secs {
                self.insights.timeout_secs = timeout;
            }
            if let Some(retries) = insights.max_retries {
                self.insights.max_retries = retries;
            }
            if let Some(backoff) = insights.retry_backoff_ms {
                self.insights.retry_backoff_ms = backoff;
            }
        }

        if let Some(budget) = raw.budget {
            if let Some(warning) = budget.warning_threshold {
                self.budget.warning_threshold = warning;
            }
            if let Some(danger) = budget.danger_threshold {
                self.budget.danger_threshold = danger;
            }
        }

        if let Some(report) = raw.report {
            if let Some(currency) = report.currency {
                self.report.currency = currency;
            }
            if let Some(rate) = report.saving_rate {
                self.report.saving_rate = rate;
            }
        }

        self.validate()
    }

    /// Apply environment overrides through `lookup`, then re-validate
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(INSIGHT_SERVICE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.insights.url = Some(url);
        }
        if let Some(backend) = lookup(INSIGHT_BACKEND_ENV).filter(|v| !v.trim().is_empty()) {
            self.insights.backend = backend.to_lowercase();
        }
        if let Some(value) = lookup(INSIGHT_TIMEOUT_ENV) {
            match value.parse() {
                Ok(secs) => self.insights.timeout_secs = secs,
                Err(_) => warn!(value = %value, "Ignoring invalid {}", INSIGHT_TIMEOUT_ENV),
            }
        }
        if let Some(value) = lookup(INSIGHT_MAX_RETRIES_ENV) {
            match value.parse() {
                Ok(retries) => self.insights.max_retries = retries,
                Err(_) => warn!(value = %value, "Ignoring invalid {}", INSIGHT_MAX_RETRIES_ENV),
            }
        }
        if let Some(value) = lookup(INSIGHT_BACKOFF_ENV) {
            match value.parse() {
                Ok(ms) => self.insights.retry_backoff_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid {}", INSIGHT_BACKOFF_ENV),
            }
        }
        if let Some(currency) = lookup(CURRENCY_ENV).filter(|v| !v.is_empty()) {
            self.report.currency = currency;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.budget.warning_threshold > self.budget.danger_threshold {
            return Err(Error::Config(format!(
                "budget.warning_threshold ({}) must not exceed budget.danger_threshold ({})",
                self.budget.warning_threshold, self.budget.danger_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.report.saving_rate) {
            return Err(Error::Config(format!(
                "report.saving_rate must be between 0 and 1, got {}",
                self.report.saving_rate
            )));
        }
        if self.insights.timeout_secs == 0 {
            return Err(Error::Config("insights.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Default override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("config.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    insights: Option<RawInsights>,
    budget: Option<RawBudget>,
    report: Option<RawReport>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    backend: Option<String>,
    url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    warning_threshold: Option<i64>,
    danger_threshold: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    currency: Option<String>,
    saving_rate: Option<f64>,
}
