//! Report rendering
//!
//! Renders a [`ReportSummary`] as a downloadable document. Every format
//! carries the same content: title, month, numbered line items, total and
//! the spending summary.

use std::fmt;
use std::str::FromStr;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::{Error, Result};
use crate::models::Month;
use crate::report::{format_amount, LineItem, ReportSummary};

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Pdf,
    Csv,
    Json,
    Text,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    /// Attachment name, e.g. `Expense_Report_2024-03.pdf`
    pub fn file_name(&self, month: Month) -> String {
        format!("Expense_Report_{}.{}", month, self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!(
                "Unknown report format: {} (expected pdf, csv, json or text)",
                s
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render `report` in `format`
pub fn render_report(report: &ReportSummary, format: ReportFormat) -> Result<Vec<u8>> {
    match format {
        ReportFormat::Pdf => render_pdf(report),
        ReportFormat::Csv => render_csv(report),
        ReportFormat::Json => Ok(serde_json::to_vec_pretty(report)?),
        ReportFormat::Text => Ok(render_text(report).into_bytes()),
    }
}

/// `3. Food - ₹200 (Sun Mar 10 2024)`
fn line_item_text(item: &LineItem, currency: &str) -> String {
    format!(
        "{}. {} - {}{} ({})",
        item.index,
        item.category,
        currency,
        format_amount(item.amount),
        item.date.format("%a %b %d %Y")
    )
}

fn total_text(report: &ReportSummary, currency: &str) -> String {
    format!("Total Spent: {}{}", currency, format_amount(report.total_spent))
}

/// Plain-text rendering
pub fn render_text(report: &ReportSummary) -> String {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push_str("\n\n");
    out.push_str(&format!("Month: {}\n\n", report.month));

    if report.line_items.is_empty() {
        out.push_str("No expenses recorded.\n");
    }
    for item in &report.line_items {
        out.push_str(&line_item_text(item, &report.currency));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&total_text(report, &report.currency));
    out.push_str("\n\nAI Spending Summary\n");
    out.push_str(&report.summary_text);
    out.push('\n');
    out
}

fn render_csv(report: &ReportSummary) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["index", "date", "category", "amount", "description"])?;

    for item in &report.line_items {
        writer.write_record([
            item.index.to_string(),
            item.date.format("%Y-%m-%d").to_string(),
            item.category.clone(),
            format!("{:.2}", item.amount),
            item.description.clone().unwrap_or_default(),
        ])?;
    }

    writer.write_record([
        String::new(),
        String::new(),
        "TOTAL".to_string(),
        format!("{:.2}", report.total_spent),
        String::new(),
    ])?;
    writer.write_record([
        String::new(),
        String::new(),
        "SUMMARY".to_string(),
        String::new(),
        report.summary_text.clone(),
    ])?;

    writer
        .into_inner()
        .map_err(|e| Error::Render(format!("Failed to finish CSV: {}", e)))
}

// A4 portrait
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.5;
const SUMMARY_WRAP: usize = 90;

/// Builtin PDF fonts only cover Latin-1
fn pdf_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '₹' => out.push_str("Rs."),
            '€' => out.push_str("EUR "),
            '’' | '‘' => out.push('\''),
            c if (c as u32) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap at `width` characters
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Writes lines top to bottom, starting new pages as needed
struct PdfCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PdfCursor {
    fn advance(&mut self, height: f32) {
        self.y -= height;
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer
            .use_text(pdf_safe(text), size, Mm(x), Mm(self.y), font);
        self.advance(LINE_HEIGHT * size / 11.0);
    }
}

fn render_pdf(report: &ReportSummary) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Render(format!("Failed to load font: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| Error::Render(format!("Failed to load font: {:?}", e)))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut cursor = PdfCursor {
        doc,
        layer,
        y: PAGE_HEIGHT - MARGIN,
    };

    // Roughly centered for a 20pt title
    cursor.text(&report.title, 20.0, PAGE_WIDTH / 2.0 - 28.0, &bold);
    cursor.advance(LINE_HEIGHT);
    cursor.text(&format!("Month: {}", report.month), 14.0, MARGIN, &regular);
    cursor.advance(LINE_HEIGHT / 2.0);

    if report.line_items.is_empty() {
        cursor.text("No expenses recorded.", 11.0, MARGIN, &regular);
    }
    for item in &report.line_items {
        cursor.text(&line_item_text(item, &report.currency), 11.0, MARGIN, &regular);
    }

    cursor.advance(LINE_HEIGHT);
    cursor.text(
        &total_text(report, &report.currency),
        14.0,
        PAGE_WIDTH - MARGIN - 60.0,
        &bold,
    );

    cursor.advance(LINE_HEIGHT * 2.0);
    cursor.text("AI Spending Summary", 14.0, MARGIN, &bold);
    for line in wrap_text(&report.summary_text, SUMMARY_WRAP) {
        cursor.text(&line, 11.0, MARGIN, &regular);
    }

    cursor
        .doc
        .save_to_bytes()
        .map_err(|e| Error::Render(format!("Failed to write PDF: {:?}", e)))
}
