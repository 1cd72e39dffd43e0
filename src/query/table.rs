//! In-memory result tables.
//!
//! A `ResultTable` is what the service's CSV artifact parses into: a header
//! row of column names plus rows of nullable cells.

use crate::athena::{FetchedRow, ResultRow};
use crate::error::{Result, ReviewError};

/// Tabular query result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Creates a table from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<ResultRow>) -> Self {
        Self { columns, rows }
    }

    /// Parses a comma-delimited UTF-8 artifact whose first line is the header.
    ///
    /// Empty cells become `None`.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ReviewError::parse(format!("Result artifact is not valid UTF-8: {e}")))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ReviewError::parse(format!("Invalid result header: {e}")))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| ReviewError::parse(format!("Invalid result row: {e}")))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }

        Ok(Self { columns, rows })
    }

    /// Builds a table from streamed rows.
    ///
    /// Named records keep their field names. Raw rows get positional names
    /// (`col1`, `col2`, ...) sized to the widest row.
    pub fn from_fetched(fetched: Vec<FetchedRow>) -> Self {
        let columns = match fetched.first() {
            Some(FetchedRow::Record(record)) => record.fields().to_vec(),
            _ => {
                let width = fetched.iter().map(|r| r.cells().len()).max().unwrap_or(0);
                (1..=width).map(|i| format!("col{i}")).collect()
            }
        };

        let rows = fetched
            .into_iter()
            .map(|row| match row {
                FetchedRow::Row(cells) => cells,
                FetchedRow::Record(record) => record.into_values(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns all cells of the column called `name`.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(|cell| cell.as_deref()))
                .collect(),
        )
    }

    /// Appends a column with `value` in every row.
    ///
    /// Does nothing if a column with that name already exists.
    pub fn add_column(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        if self.column_index(&name).is_some() {
            return;
        }
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }
}
