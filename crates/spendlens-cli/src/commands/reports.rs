//! Report command implementation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use spendlens_core::{
    build_report, export::render_text, render_report, Database, Month, ReportFormat,
    ReportSettings,
};
use tracing::debug;

/// Print or write the monthly report
///
/// Without a format or output path the report is printed as text. Returns
/// the written path otherwise.
pub fn cmd_report(
    db: &Database,
    owner: &str,
    month: Month,
    settings: &ReportSettings,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let expenses = db
        .list_expenses_for_month(owner, month)
        .context("Failed to read expenses")?;
    let report = build_report(month, &expenses, settings);
    debug!(month = %month, items = report.line_items.len(), "Built report");

    if format.is_none() && output.is_none() {
        print!("{}", render_text(&report));
        return Ok(None);
    }

    let format = match format {
        Some(f) => f.parse::<ReportFormat>().map_err(|e| anyhow!(e))?,
        None => output
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default(),
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format.file_name(month)));

    // Rendered fully before the file is created
    let bytes = render_report(&report, format).context("Failed to render report")?;
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    db.log_audit(
        owner,
        "export",
        Some("monthly_report"),
        None,
        Some(&format!("month={}, format={}, via cli", month, format)),
    )?;

    println!(
        "📄 Wrote {} report for {} to {} ({} bytes)",
        format,
        month,
        path.display(),
        bytes.len()
    );
    Ok(Some(path))
}
