//! SpendLens CLI - Expense tracker with budget-aware insights
//!
//! Usage:
//!   spendlens init                          Initialize database
//!   spendlens expenses add Food 250         Record an expense
//!   spendlens budgets set Food 5000         Set this month's Food budget
//!   spendlens insights                      Show the spending insight
//!   spendlens report --month 2024-03        Print the monthly report
//!   spendlens serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use spendlens_core::{InsightClient, Month};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            match action {
                None => commands::cmd_expenses_list(&db, &cli.user, 20, &config.report.currency),
                Some(ExpensesAction::List { limit }) => {
                    commands::cmd_expenses_list(&db, &cli.user, limit, &config.report.currency)
                }
                Some(ExpensesAction::Add {
                    category,
                    amount,
                    date,
                    description,
                }) => commands::cmd_expenses_add(
                    &db,
                    &cli.user,
                    &category,
                    amount,
                    date.as_deref(),
                    description.as_deref(),
                )
                .map(|_| ()),
                Some(ExpensesAction::Delete { id }) => {
                    commands::cmd_expenses_delete(&db, &cli.user, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let currency = &config.report.currency;
            match action {
                None => commands::cmd_budgets_list(&db, &cli.user, None, currency),
                Some(BudgetsAction::List { month }) => {
                    let month = month
                        .as_deref()
                        .map(|m| commands::parse_month(Some(m)))
                        .transpose()?;
                    commands::cmd_budgets_list(&db, &cli.user, month, currency)
                }
                Some(BudgetsAction::Set {
                    category,
                    limit,
                    month,
                }) => {
                    let month = commands::parse_month(month.as_deref())?;
                    commands::cmd_budgets_set(&db, &cli.user, &category, limit, month).map(|_| ())
                }
                Some(BudgetsAction::Delete { id }) => {
                    commands::cmd_budgets_delete(&db, &cli.user, id)
                }
                Some(BudgetsAction::Progress { month }) => {
                    let month = commands::parse_month(month.as_deref())?;
                    commands::cmd_budgets_progress(
                        &db,
                        &cli.user,
                        month,
                        &config.budget,
                        currency,
                    )
                    .map(|_| ())
                }
            }
        }
        Commands::Insights { json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let client = InsightClient::from_config(&config.insights);
            commands::cmd_insights(
                &db,
                &cli.user,
                client.as_ref(),
                Month::current(),
                &config.budget,
                json,
            )
            .await
            .map(|_| ())
        }
        Commands::Report {
            month,
            format,
            output,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let month = commands::parse_month(Some(&month))?;
            commands::cmd_report(
                &db,
                &cli.user,
                month,
                &config.report,
                format.as_deref(),
                output.as_deref(),
            )
            .map(|_| ())
        }
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt, config).await
        }
    }
}
