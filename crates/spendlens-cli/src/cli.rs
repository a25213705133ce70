//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SpendLens - Track expenses, budgets and spending insights
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Self-hosted expense tracker with budget-aware insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendlens.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPENDLENS_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Identity that owns the expenses and budgets
    ///
    /// Matches the identity the web server uses (`local-dev` with --no-auth).
    #[arg(long, default_value = "local-dev", global = true)]
    pub user: String,

    /// Config override file (defaults to ~/.local/share/spendlens/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage expenses (list, add, delete)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Manage monthly budgets (list, set, delete, progress)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Show the budget-aware spending insight for the current month
    Insights {
        /// Print the raw insight JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the monthly expense report
    Report {
        /// Month to report on (YYYY-MM)
        #[arg(short, long)]
        month: String,

        /// Write the report in this format: pdf, csv, json, text
        ///
        /// Without --format or --output the report is printed as text.
        #[arg(short, long)]
        format: Option<String>,

        /// Output file (defaults to Expense_Report_<month>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires Cloudflare Access headers or an API key.
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List recent expenses, newest first
    List {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Record an expense
    Add {
        /// Category (e.g. Food, Travel)
        category: String,
        /// Amount spent
        amount: f64,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets
    List {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Create or replace a category's limit for a month
    Set {
        /// Category the limit applies to
        category: String,
        /// Spending limit
        limit: f64,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },
    /// Show spending against each budget
    Progress {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
}
