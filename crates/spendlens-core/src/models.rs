//! Domain models for SpendLens

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A calendar month in `YYYY-MM` form
///
/// Serialized as the literal `YYYY-MM` string. Month boundaries are computed
/// from the calendar (first day inclusive, first day of the next month
/// exclusive) so short months never rely on a fixed day-31 cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    /// Create a month from a year and a 1-based month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=9998).contains(&year) {
            return Err(Error::InvalidInput(format!(
                "Year out of range: {} (expected 0001-9998)",
                year
            )));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            Error::InvalidInput(format!("Invalid month number: {} (expected 01-12)", month))
        })?;
        Ok(Self { first })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// The current month in UTC
    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// First day of the month (inclusive lower bound)
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// First day of the following month (exclusive upper bound)
    pub fn next_month_start(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Last day of the month (inclusive upper bound)
    pub fn last_day(&self) -> NaiveDate {
        self.next_month_start().pred_opt().unwrap_or(self.first)
    }

    /// Number of days in the month
    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    /// Whether `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date < self.next_month_start()
    }

    /// The preceding month
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = Error;

    /// Parse the literal `YYYY-MM` form (no day, no surrounding whitespace)
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("Invalid month '{}' (use YYYY-MM)", s));

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year_part, month_part) = (&s[..4], &s[5..]);
        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Month {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// Identity of the user who owns this expense
    pub owner: String,
    pub category: String,
    /// Amount spent (never negative)
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a new expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewExpense {
    /// Check amount and category before the expense reaches the store
    pub fn validate(&self) -> Result<()> {
        validate_category(&self.category)?;
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Expense amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A monthly spending limit for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub owner: String,
    pub category: String,
    pub limit: f64,
    pub month: Month,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for setting a budget (upserted by owner + category + month)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: String,
    pub limit: f64,
    pub month: Month,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        validate_category(&self.category)?;
        if !self.limit.is_finite() || self.limit <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Budget limit must be a positive number, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}

fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::InvalidInput("Category is required".to_string()));
    }
    if category.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidInput(format!(
            "Category contains control characters: {:?}",
            category
        )));
    }
    Ok(())
}
