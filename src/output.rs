//! Output formatting for query results.
//!
//! Renders a `ResultTable` as an aligned text table, CSV, or JSON.

use crate::error::{Result, ReviewError};
use crate::query::ResultTable;
use serde::Serialize;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// Comma-separated values with a header row.
    Csv,
    /// JSON object with `columns` and `rows`.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid output format: {s}. Expected: text, csv, or json"
            )),
        }
    }
}

/// Renders `table` in the given format.
pub fn render(table: &ResultTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(table)),
        OutputFormat::Csv => render_csv(table),
        OutputFormat::Json => render_json(table),
    }
}

const NULL_DISPLAY: &str = "NULL";

fn render_text(table: &ResultTable) -> String {
    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in table.rows() {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.as_deref().unwrap_or(NULL_DISPLAY).chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(table.len() + 3);
    lines.push(format_line(
        table.columns().iter().map(String::as_str).collect(),
    ));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in table.rows() {
        lines.push(format_line(
            row.iter()
                .map(|cell| cell.as_deref().unwrap_or(NULL_DISPLAY))
                .collect(),
        ));
    }

    let noun = if table.len() == 1 { "row" } else { "rows" };
    lines.push(format!("({} {})", table.len(), noun));
    format!("{}\n", lines.join("\n"))
}

fn render_csv(table: &ResultTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns())
        .map_err(|e| ReviewError::internal(format!("Failed to write CSV: {e}")))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(|e| ReviewError::internal(format!("Failed to write CSV: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReviewError::internal(format!("Failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ReviewError::internal(format!("CSV is not UTF-8: {e}")))
}

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    columns: &'a [String],
    rows: &'a [Vec<Option<String>>],
    row_count: usize,
}

fn render_json(table: &ResultTable) -> Result<String> {
    let output = JsonOutput {
        columns: table.columns(),
        rows: table.rows(),
        row_count: table.len(),
    };
    serde_json::to_string_pretty(&output)
        .map(|json| format!("{json}\n"))
        .map_err(|e| ReviewError::internal(format!("Failed to serialize JSON: {e}")))
}
