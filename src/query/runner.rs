//! Query submission, polling and result retrieval.
//!
//! `QueryRunner` drives one query at a time through the service: submit,
//! poll on the staggered schedule until a terminal state, then fetch the
//! results either as a paginated stream or as the CSV artifact the service
//! wrote to its output location.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use tracing::{debug, info};

use super::listeners::ListenerRegistry;
use super::rows::stream_rows;
use super::schedule::next_wait;
use super::summary::summary_line;
use super::table::ResultTable;
use crate::athena::{
    ArtifactStore, FetchedRow, OutputLocation, QueryExecution, QueryHandle, QueryRequest,
    QueryService, QueryState,
};
use crate::error::{Result, ReviewError};

/// Runs queries against a query service.
pub struct QueryRunner {
    service: Arc<dyn QueryService>,
    artifacts: Arc<dyn ArtifactStore>,
    listeners: ListenerRegistry,
}

impl QueryRunner {
    /// Creates a runner over the given service, artifact store and listeners.
    pub fn new(
        service: Arc<dyn QueryService>,
        artifacts: Arc<dyn ArtifactStore>,
        listeners: ListenerRegistry,
    ) -> Self {
        Self {
            service,
            artifacts,
            listeners,
        }
    }

    /// Submits a query and notifies the registered listeners.
    pub async fn submit(&self, request: &QueryRequest) -> Result<QueryHandle> {
        let handle = self.service.start_query(request).await?;
        info!("Submitted query {}", handle);

        self.listeners.notify(&handle, &request.query)?;
        Ok(handle)
    }

    /// Polls until the query reaches a terminal state or `timeout` runs out.
    ///
    /// Returns the final execution on success.
    pub async fn await_completion(
        &self,
        handle: &QueryHandle,
        timeout: Duration,
    ) -> Result<QueryExecution> {
        let mut elapsed = Duration::ZERO;

        loop {
            if elapsed >= timeout {
                return Err(ReviewError::Timeout(timeout));
            }

            let wait = next_wait(elapsed, timeout);
            tokio::time::sleep(wait).await;
            elapsed += wait;

            let Some(execution) = self.service.get_execution(handle).await? else {
                debug!("No execution details for query {} yet", handle);
                continue;
            };
            debug!(
                "Query {} is {} after {}s",
                handle,
                execution.status.state,
                elapsed.as_secs()
            );

            match &execution.status.state {
                QueryState::Queued | QueryState::Running => {}
                QueryState::Succeeded => {
                    if let Some(summary) = summary_line(&execution) {
                        info!("{}", summary);
                    }
                    return Ok(execution);
                }
                QueryState::Failed => {
                    return Err(ReviewError::query_failed(reason_of(&execution)));
                }
                QueryState::Cancelled => {
                    return Err(ReviewError::query_cancelled(reason_of(&execution)));
                }
                QueryState::Unrecognized(state) => {
                    return Err(ReviewError::protocol(format!(
                        "Query {handle} in unexpected state: {state}"
                    )));
                }
            }
        }
    }

    /// Submits a query and waits for it with the request's timeout.
    pub async fn run(&self, request: &QueryRequest) -> Result<QueryExecution> {
        let handle = self.submit(request).await?;
        self.await_completion(&handle, request.timeout).await
    }

    /// Streams the results of a finished query, 1000 rows per page.
    pub fn fetch_rows(
        &self,
        handle: &QueryHandle,
        extract_header: bool,
    ) -> BoxStream<'_, Result<FetchedRow>> {
        stream_rows(self.service.as_ref(), handle.clone(), extract_header)
    }

    /// Loads the CSV artifact of a finished query from its output location.
    pub async fn fetch_table(&self, handle: &QueryHandle) -> Result<ResultTable> {
        let execution = self.service.get_execution(handle).await?.ok_or_else(|| {
            ReviewError::protocol(format!("No execution details for query {handle}"))
        })?;
        self.load_table(&execution).await
    }

    /// Runs a query and loads its CSV artifact.
    pub async fn query_table(&self, request: &QueryRequest) -> Result<ResultTable> {
        let execution = self.run(request).await?;
        self.load_table(&execution).await
    }

    async fn load_table(&self, execution: &QueryExecution) -> Result<ResultTable> {
        let uri = execution.output_location.as_deref().ok_or_else(|| {
            ReviewError::storage(format!(
                "Query {} has no output location",
                execution.handle
            ))
        })?;
        let location = OutputLocation::parse(uri)?;

        let data = self.artifacts.get_object(&location).await?;
        let table = ResultTable::from_csv(&data)?;
        debug!("Loaded {} rows from {}", table.len(), location);
        Ok(table)
    }
}

fn reason_of(execution: &QueryExecution) -> String {
    execution
        .status
        .reason
        .clone()
        .unwrap_or_else(|| "no reason given".to_string())
}
