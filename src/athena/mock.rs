//! Mock query service and artifact store for testing.
//!
//! Provides scripted, in-memory implementations used by the tests and the
//! `--mock` CLI mode.

use super::{
    ArtifactStore, OutputLocation, QueryExecution, QueryHandle, QueryRequest, QueryService,
    QueryState, QueryStatistics, QueryStatus, ResultPage, ResultRow,
};
use crate::error::{Result, ReviewError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock query service that replays a scripted sequence of statuses.
///
/// Each status call consumes the next scripted status; the last one is
/// repeated once the script is exhausted. `None` entries simulate a status
/// response without execution details.
#[derive(Debug, Default)]
pub struct MockQueryService {
    script: Mutex<VecDeque<Option<QueryStatus>>>,
    statistics: Option<QueryStatistics>,
    rows: Vec<ResultRow>,
    submit_error: Option<String>,
    submitted: Mutex<Vec<QueryRequest>>,
    status_calls: Mutex<Vec<tokio::time::Instant>>,
    page_requests: Mutex<Vec<(Option<String>, i32)>>,
}

impl MockQueryService {
    /// Creates a mock whose queries succeed on the first poll with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the status script with the given states.
    pub fn with_states(self, states: impl IntoIterator<Item = QueryState>) -> Self {
        self.with_statuses(states.into_iter().map(|s| Some(QueryStatus::new(s))))
    }

    /// Replaces the status script with full statuses.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = Option<QueryStatus>>) -> Self {
        *lock(&self.script) = statuses.into_iter().collect();
        self
    }

    /// Sets the statistics reported with every status.
    pub fn with_statistics(mut self, statistics: QueryStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Sets the result rows served by `get_results_page`.
    pub fn with_rows(mut self, rows: Vec<ResultRow>) -> Self {
        self.rows = rows;
        self
    }

    /// Makes every submission fail with the given message.
    pub fn with_submit_error(mut self, msg: impl Into<String>) -> Self {
        self.submit_error = Some(msg.into());
        self
    }

    /// A mock pre-loaded with a small reviewable result set.
    pub fn demo() -> Self {
        Self::new()
            .with_states([QueryState::Queued, QueryState::Running, QueryState::Succeeded])
            .with_statistics(QueryStatistics {
                total_execution_time: Duration::from_millis(2350),
                queue_time: Duration::from_millis(410),
                data_scanned_bytes: 3 * 1024 * 1024,
            })
            .with_rows(demo_rows())
    }

    /// Returns the requests submitted so far.
    pub fn submitted(&self) -> Vec<QueryRequest> {
        lock(&self.submitted).clone()
    }

    /// Returns the (paused-clock) instants at which status was requested.
    pub fn status_calls(&self) -> Vec<tokio::time::Instant> {
        lock(&self.status_calls).clone()
    }

    /// Returns the `(next_token, page_size)` of every page request.
    pub fn page_requests(&self) -> Vec<(Option<String>, i32)> {
        lock(&self.page_requests).clone()
    }

    fn next_status(&self) -> Option<QueryStatus> {
        let mut script = lock(&self.script);
        match script.len() {
            0 => Some(QueryStatus::new(QueryState::Succeeded)),
            1 => script[0].clone(),
            _ => script.pop_front().flatten(),
        }
    }

    fn output_location_for(&self, handle: &QueryHandle) -> Option<String> {
        lock(&self.submitted)
            .last()
            .map(|request| format!("{}{}.csv", request.output_location, handle.id()))
    }
}

#[async_trait]
impl QueryService for MockQueryService {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle> {
        if let Some(msg) = &self.submit_error {
            return Err(ReviewError::submission(msg.clone()));
        }
        let mut submitted = lock(&self.submitted);
        submitted.push(request.clone());
        Ok(QueryHandle::new(format!("mock-query-{}", submitted.len())))
    }

    async fn get_execution(&self, handle: &QueryHandle) -> Result<Option<QueryExecution>> {
        lock(&self.status_calls).push(tokio::time::Instant::now());

        let Some(status) = self.next_status() else {
            return Ok(None);
        };

        let mut execution = QueryExecution::new(handle.clone(), status);
        if let Some(statistics) = self.statistics {
            execution = execution.with_statistics(statistics);
        }
        if let Some(location) = self.output_location_for(handle) {
            execution = execution.with_output_location(location);
        }
        Ok(Some(execution))
    }

    async fn get_results_page(
        &self,
        _handle: &QueryHandle,
        next_token: Option<String>,
        page_size: i32,
    ) -> Result<ResultPage> {
        lock(&self.page_requests).push((next_token.clone(), page_size));

        let offset = match next_token.as_deref() {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ReviewError::service(format!("Invalid page token: {token}")))?,
        };
        let end = (offset + page_size.max(1) as usize).min(self.rows.len());
        let rows = self.rows.get(offset..end).unwrap_or_default().to_vec();
        let next_token = (end < self.rows.len()).then(|| end.to_string());

        Ok(ResultPage { rows, next_token })
    }
}

/// A mock artifact store backed by a map of objects.
#[derive(Debug, Default)]
pub struct MockArtifactStore {
    objects: HashMap<(String, String), Vec<u8>>,
    fallback: Option<Vec<u8>>,
    requested: Mutex<Vec<OutputLocation>>,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object at `bucket`/`key`.
    pub fn with_object(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.objects.insert((bucket.into(), key.into()), data.into());
        self
    }

    /// Serves `data` for any location without an explicit object.
    pub fn with_fallback(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.fallback = Some(data.into());
        self
    }

    /// A store that answers every location with the demo rows as CSV.
    pub fn demo() -> Self {
        Self::new().with_fallback(rows_to_csv(&demo_rows()))
    }

    /// Returns the locations requested so far.
    pub fn requested(&self) -> Vec<OutputLocation> {
        lock(&self.requested).clone()
    }
}

#[async_trait]
impl ArtifactStore for MockArtifactStore {
    async fn get_object(&self, location: &OutputLocation) -> Result<Vec<u8>> {
        lock(&self.requested).push(location.clone());

        self.objects
            .get(&(location.bucket.clone(), location.key.clone()))
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ReviewError::storage(format!("No such object: {location}")))
    }
}

/// Encodes rows the way Athena writes its CSV artifact: every value
/// quoted, nulls left empty.
pub fn rows_to_csv(rows: &[ResultRow]) -> Vec<u8> {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(value) => format!("\"{}\"", value.replace('"', "\"\"")),
                None => String::new(),
            })
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

fn demo_rows() -> Vec<ResultRow> {
    [
        ["name", "npi", "affiliate"],
        ["compass oncology", "1427051473", "the us oncology network"],
        ["compass oncology", "1427051473", "providence health"],
        ["texas oncology", "1851325213", "the us oncology network"],
    ]
    .iter()
    .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
    .collect()
}
