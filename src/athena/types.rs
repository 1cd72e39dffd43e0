//! Query service types for athena-review.
//!
//! Defines the structures exchanged with the query service: requests,
//! handles, execution snapshots and result rows.

use crate::error::{Result, ReviewError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A query to submit. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// SQL text.
    pub query: String,

    /// Target database (Glue schema).
    pub database: String,

    /// Target data catalog.
    pub catalog: String,

    /// Storage URI the service writes results to.
    pub output_location: String,

    /// Execution group the query runs in.
    pub workgroup: String,

    /// Polling budget.
    pub timeout: Duration,
}

impl QueryRequest {
    /// Creates a request with the given SQL and all other fields empty.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            database: String::new(),
            catalog: String::new(),
            output_location: String::new(),
            workgroup: String::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = catalog.into();
        self
    }

    pub fn with_output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = location.into();
        self
    }

    pub fn with_workgroup(mut self, workgroup: impl Into<String>) -> Self {
        self.workgroup = workgroup.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Opaque identifier of a submitted query execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryHandle(String);

impl QueryHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the service-side execution id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution state reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A state this client does not know about.
    Unrecognized(String),
}

impl QueryState {
    /// Parses a state as the service spells it (`QUEUED`, `RUNNING`, ...).
    pub fn parse(s: &str) -> Self {
        match s {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns the state as the service spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unrecognized(s) => s,
        }
    }

    /// Returns true if no further transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State plus the service's explanation of the last transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: QueryState,
    pub reason: Option<String>,
}

impl QueryStatus {
    pub fn new(state: QueryState) -> Self {
        Self {
            state,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Execution statistics, present once the query is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStatistics {
    pub total_execution_time: Duration,
    pub queue_time: Duration,
    pub data_scanned_bytes: u64,
}

/// Snapshot of a query execution as returned by a status call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecution {
    pub handle: QueryHandle,
    pub status: QueryStatus,
    pub statistics: Option<QueryStatistics>,
    /// Where the service wrote (or will write) the result artifact.
    pub output_location: Option<String>,
}

impl QueryExecution {
    pub fn new(handle: QueryHandle, status: QueryStatus) -> Self {
        Self {
            handle,
            status,
            statistics: None,
            output_location: None,
        }
    }

    pub fn with_statistics(mut self, statistics: QueryStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    pub fn with_output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = Some(location.into());
        self
    }
}

/// One result row: ordered, nullable string cells.
pub type ResultRow = Vec<Option<String>>;

/// One page of results plus the token for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub rows: Vec<ResultRow>,
    pub next_token: Option<String>,
}

/// A result row whose cells are named by the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    fields: Arc<[String]>,
    values: ResultRow,
}

impl ResultRecord {
    /// Names `values` with `fields`. Both must have the same length.
    pub fn new(fields: Arc<[String]>, values: ResultRow) -> Result<Self> {
        if fields.len() != values.len() {
            return Err(ReviewError::protocol(format!(
                "Result row has {} cells but the header names {} fields",
                values.len(),
                fields.len()
            )));
        }
        Ok(Self { fields, values })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Returns the value of the first field called `name`.
    ///
    /// `None` if there is no such field or the cell is null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .position(|f| f == name)
            .and_then(|i| self.values[i].as_deref())
    }

    pub fn into_values(self) -> ResultRow {
        self.values
    }
}

/// A row produced by `fetch_rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedRow {
    /// Raw cells (header extraction disabled).
    Row(ResultRow),
    /// Cells named by the header row.
    Record(ResultRecord),
}

impl FetchedRow {
    /// Returns the cells regardless of variant.
    pub fn cells(&self) -> &[Option<String>] {
        match self {
            Self::Row(row) => row,
            Self::Record(record) => record.values(),
        }
    }
}

/// An `s3://bucket/key` storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub bucket: String,
    pub key: String,
}

impl OutputLocation {
    /// Splits a storage URI into bucket and key.
    ///
    /// The third `/`-separated component is the bucket, everything after it
    /// is the key.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| ReviewError::storage(format!("Invalid output location: '{uri}'")))?;

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(ReviewError::storage(format!(
                "Output location '{uri}' has no bucket"
            )));
        }
        if key.is_empty() {
            return Err(ReviewError::storage(format!(
                "Output location '{uri}' has no object key"
            )));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
