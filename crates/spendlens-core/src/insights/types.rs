//! Insight result types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Insight severity levels understood by SpendLens
///
/// The insight service may send other labels (for example `good`); those are
/// passed through untouched and map to `None` in [`InsightResult::severity_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "danger" => Ok(Self::Danger),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn zero() -> Number {
    Number::from(0)
}

/// An insight as returned to clients
///
/// `title` and `message` are required from the insight service; everything
/// it sends beyond the named fields is kept in `extra` and serialized back
/// unchanged (`anomaly`, `forecast`, `savingTip`, `autoBudget`, ...). An
/// explicit `null` for `severity` or `topCategory` is also sent back as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InsightWire", into = "InsightWire")]
pub struct InsightResult {
    pub title: String,
    pub message: String,
    pub percentage: Number,
    pub severity: Option<String>,
    /// Integer percent of the top category's budget, present only when a
    /// budget exists for the current month
    pub budget_usage: Option<i64>,
    pub top_category: Option<String>,
    pub extra: Map<String, Value>,
    received_nulls: ReceivedNulls,
}

/// Named fields the insight service sent as `null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReceivedNulls {
    severity: bool,
    top_category: bool,
}

/// JSON shape of [`InsightResult`]; `Some(None)` is an explicit `null`
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightWire {
    title: String,
    message: String,
    #[serde(default = "zero")]
    percentage: Number,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    severity: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    budget_usage: Option<i64>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    top_category: Option<Option<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Marks a key as present, keeping `null` distinct from absent
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Value if set, `null` if it arrived as `null`, otherwise absent
fn to_wire(value: Option<String>, received_null: bool) -> Option<Option<String>> {
    match value {
        Some(v) => Some(Some(v)),
        None if received_null => Some(None),
        None => None,
    }
}

impl From<InsightWire> for InsightResult {
    fn from(wire: InsightWire) -> Self {
        let received_nulls = ReceivedNulls {
            severity: matches!(wire.severity, Some(None)),
            top_category: matches!(wire.top_category, Some(None)),
        };
        Self {
            title: wire.title,
            message: wire.message,
            percentage: wire.percentage,
            severity: wire.severity.flatten(),
            budget_usage: wire.budget_usage,
            top_category: wire.top_category.flatten(),
            extra: wire.extra,
            received_nulls,
        }
    }
}

impl From<InsightResult> for InsightWire {
    fn from(insight: InsightResult) -> Self {
        Self {
            title: insight.title,
            message: insight.message,
            percentage: insight.percentage,
            severity: to_wire(insight.severity, insight.received_nulls.severity),
            budget_usage: insight.budget_usage,
            top_category: to_wire(insight.top_category, insight.received_nulls.top_category),
            extra: insight.extra,
        }
    }
}

impl InsightResult {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            percentage: zero(),
            severity: None,
            budget_usage: None,
            top_category: None,
            extra: Map::new(),
            received_nulls: ReceivedNulls::default(),
        }
    }

    pub fn with_percentage(mut self, percentage: i64) -> Self {
        self.percentage = Number::from(percentage);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.set_severity(severity);
        self
    }

    pub fn with_top_category(mut self, category: impl Into<String>) -> Self {
        self.top_category = Some(category.into());
        self
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = Some(severity.as_str().to_string());
    }

    /// Parsed severity, if it is one of the known levels
    pub fn severity_level(&self) -> Option<Severity> {
        self.severity.as_deref().and_then(|s| s.parse().ok())
    }

    /// Category the insight is about
    ///
    /// Uses `topCategory` when sent, else `autoBudget.category`.
    pub fn resolved_top_category(&self) -> Option<&str> {
        if let Some(category) = self.top_category.as_deref().filter(|c| !c.is_empty()) {
            return Some(category);
        }
        self.extra
            .get("autoBudget")
            .and_then(|auto| auto.get("category"))
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
    }

    /// Append a paragraph to the message
    pub fn append_notice(&mut self, notice: &str) {
        self.message.push_str("\n\n");
        self.message.push_str(notice);
    }
}
