//! Wire types for the insight service

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Expense;

/// One expense as sent to the insight service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiExpense {
    pub category: String,
    pub amount: f64,
    /// RFC 3339 timestamp at midnight UTC of the expense date
    pub date: String,
}

impl From<&Expense> for AiExpense {
    fn from(expense: &Expense) -> Self {
        Self {
            category: expense.category.clone(),
            amount: expense.amount,
            date: expense.date.format("%Y-%m-%dT00:00:00Z").to_string(),
        }
    }
}

/// Request body for `POST {base}/insights`
///
/// Built once per request from a single expense snapshot; the same snapshot
/// is later used to total the top category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    pub expenses: Vec<AiExpense>,
}

impl InsightRequest {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        Self {
            expenses: expenses.iter().map(AiExpense::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

/// Timeout and retry settings for insight service calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Extra attempts after the first failure
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
