//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, config) and init/audit
//! - `expenses` - Expense commands (list, add, delete)
//! - `budgets` - Budget commands (list, set, delete, progress)
//! - `insights` - Budget-aware insight for the current month
//! - `reports` - Monthly report printing and export
//! - `serve` - Web server command

pub mod budgets;
pub mod core;
pub mod expenses;
pub mod insights;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use expenses::*;
pub use insights::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to at most `max` characters, marking the cut with "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
