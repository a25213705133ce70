//! SpendLens Core Library
//!
//! Shared functionality for the SpendLens expense tracker:
//! - Expense and budget store with migrations and optional encryption
//! - Insight service client (HTTP and local mock backends)
//! - Budget-aware insight aggregation
//! - Monthly report aggregation and rendering (PDF, CSV, JSON, text)
//! - Layered configuration

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod report;

/// Test utilities including a mock insight service
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AiExpense, HttpInsightBackend, InsightBackend, InsightClient, InsightRequest,
    MockInsightBackend, RetryPolicy,
};
pub use config::{AppConfig, BudgetPolicy, InsightServiceConfig, ReportSettings};
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use export::{render_report, ReportFormat};
pub use insights::{
    apply_budget, budget_progress, generate_insight, no_data_insight, BudgetProgress,
    BudgetSource, InsightResult, Severity,
};
pub use models::{Budget, Expense, Month, NewBudget, NewExpense};
pub use report::{build_report, LineItem, ReportSummary};
