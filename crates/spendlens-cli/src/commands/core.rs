//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Layered configuration with an optional override file
//! - `parse_month` - `YYYY-MM` argument parsing
//! - `cmd_init` - Initialize the database
//! - `cmd_audit` - Show the audit log

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use spendlens_core::{AppConfig, Database, Month};

use super::truncate;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow!("Database path must be valid UTF-8"))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn load_config(override_path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load_from(override_path).context("Failed to load configuration")
}

/// Parse a `YYYY-MM` argument, defaulting to the current month
pub fn parse_month(value: Option<&str>) -> Result<Month> {
    match value {
        Some(s) => s
            .parse()
            .with_context(|| format!("Invalid month '{}' (use YYYY-MM)", s)),
        None => Ok(Month::current()),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: spendlens expenses add Food 250");
    println!("  2. Set a budget: spendlens budgets set Food 5000");
    println!("  3. Start web API: spendlens serve");

    Ok(())
}

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(limit.max(1))?;

    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }

    println!();
    println!("📜 Audit Log");
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in entries {
        let target = match (&entry.entity_type, entry.entity_id) {
            (Some(kind), Some(id)) => format!("{} #{}", kind, id),
            (Some(kind), None) => kind.clone(),
            _ => String::new(),
        };
        println!(
            "   {} │ {:<24} │ {:<8} │ {}",
            entry.timestamp,
            truncate(&entry.user_email, 24),
            entry.action,
            target
        );
    }

    Ok(())
}
