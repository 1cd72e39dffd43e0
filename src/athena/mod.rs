//! Query service abstraction layer.
//!
//! Provides trait-based interfaces for the analytic query service and the
//! storage it writes result artifacts to, so the AWS clients and the
//! in-memory mocks can be used interchangeably.

mod aws;
mod mock;
mod types;

pub use aws::{AthenaClient, S3ArtifactStore};
pub use mock::{rows_to_csv, MockArtifactStore, MockQueryService};
pub use types::{
    FetchedRow, OutputLocation, QueryExecution, QueryHandle, QueryRequest, QueryState,
    QueryStatistics, QueryStatus, ResultPage, ResultRecord, ResultRow,
};

use crate::config::AthenaConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Service clients built from one AWS configuration.
pub struct ServiceClients {
    pub queries: Arc<dyn QueryService>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

/// Creates the AWS-backed query service and artifact store.
///
/// This is the central factory function for service connections.
pub async fn connect(config: &AthenaConfig) -> Result<ServiceClients> {
    let sdk_config = aws::load_sdk_config(config).await?;
    Ok(ServiceClients {
        queries: Arc::new(AthenaClient::new(&sdk_config)),
        artifacts: Arc::new(S3ArtifactStore::new(&sdk_config)),
    })
}

/// Interface to the analytic query service.
///
/// All operations are async and return Results with ReviewError.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submits a query and returns the service's handle for it.
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle>;

    /// Fetches the current execution snapshot.
    ///
    /// `None` when the service answered without execution details.
    async fn get_execution(&self, handle: &QueryHandle) -> Result<Option<QueryExecution>>;

    /// Fetches one page of results, starting at `next_token` if given.
    async fn get_results_page(
        &self,
        handle: &QueryHandle,
        next_token: Option<String>,
        page_size: i32,
    ) -> Result<ResultPage>;
}

/// Interface to the storage the service writes result artifacts to.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Reads a whole object.
    async fn get_object(&self, location: &OutputLocation) -> Result<Vec<u8>>;
}
