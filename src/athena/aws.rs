//! AWS implementations of the query service and artifact store.
//!
//! `AthenaClient` talks to Athena through aws-sdk-athena and
//! `S3ArtifactStore` reads result artifacts through aws-sdk-s3. Both are
//! built from one `SdkConfig`.

use super::{
    ArtifactStore, OutputLocation, QueryExecution, QueryHandle, QueryRequest, QueryService,
    QueryState, QueryStatistics, QueryStatus, ResultPage, ResultRow,
};
use crate::config::AthenaConfig;
use crate::error::{Result, ReviewError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use std::time::Duration;
use tracing::debug;

/// Loads the shared AWS configuration.
///
/// Static keys from the config take precedence over the default provider
/// chain. A region is required.
pub(super) async fn load_sdk_config(config: &AthenaConfig) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    match (&config.access_key_id, &config.secret_access_key) {
        (Some(access_key), Some(secret_key)) => {
            debug!("Using static AWS credentials from configuration");
            let credentials = Credentials::from_keys(access_key.clone(), secret_key.clone(), None);
            loader = loader.credentials_provider(credentials);
        }
        (None, None) => {}
        _ => {
            return Err(ReviewError::config(
                "Both access_key_id and secret_access_key must be set, or neither",
            ))
        }
    }

    let sdk_config = loader.load().await;
    if sdk_config.region().is_none() {
        return Err(ReviewError::config(
            "No AWS region configured. Set athena.region or AWS_REGION",
        ));
    }

    Ok(sdk_config)
}

/// Athena query service client.
#[derive(Debug, Clone)]
pub struct AthenaClient {
    client: aws_sdk_athena::Client,
}

impl AthenaClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_athena::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl QueryService for AthenaClient {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle> {
        let context = QueryExecutionContext::builder()
            .set_database(non_empty(&request.database))
            .set_catalog(non_empty(&request.catalog))
            .build();
        let result_configuration = ResultConfiguration::builder()
            .set_output_location(non_empty(&request.output_location))
            .build();

        let output = self
            .client
            .start_query_execution()
            .query_string(&request.query)
            .query_execution_context(context)
            .result_configuration(result_configuration)
            .set_work_group(non_empty(&request.workgroup))
            .send()
            .await
            .map_err(|e| ReviewError::submission(DisplayErrorContext(&e).to_string()))?;

        output
            .query_execution_id()
            .map(QueryHandle::new)
            .ok_or_else(|| ReviewError::submission("Service returned no query execution id"))
    }

    async fn get_execution(&self, handle: &QueryHandle) -> Result<Option<QueryExecution>> {
        let output = self
            .client
            .get_query_execution()
            .query_execution_id(handle.id())
            .send()
            .await
            .map_err(|e| {
                ReviewError::service(format!(
                    "Failed to get status of query {handle}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        output
            .query_execution()
            .map(|execution| convert_execution(handle, execution))
            .transpose()
    }

    async fn get_results_page(
        &self,
        handle: &QueryHandle,
        next_token: Option<String>,
        page_size: i32,
    ) -> Result<ResultPage> {
        let output = self
            .client
            .get_query_results()
            .query_execution_id(handle.id())
            .set_next_token(next_token)
            .max_results(page_size)
            .send()
            .await
            .map_err(|e| {
                ReviewError::service(format!(
                    "Failed to get results of query {handle}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let rows: Vec<ResultRow> = output
            .result_set()
            .map(|result_set| {
                result_set
                    .rows()
                    .iter()
                    .map(|row| {
                        row.data()
                            .iter()
                            .map(|datum| datum.var_char_value().map(String::from))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultPage {
            rows,
            next_token: output.next_token().map(String::from),
        })
    }
}

/// Converts an SDK execution into our snapshot type.
fn convert_execution(
    handle: &QueryHandle,
    execution: &aws_sdk_athena::types::QueryExecution,
) -> Result<QueryExecution> {
    let status = execution
        .status()
        .ok_or_else(|| ReviewError::protocol(format!("Query {handle} has no status")))?;
    let state = status
        .state()
        .map(|s| QueryState::parse(s.as_str()))
        .ok_or_else(|| ReviewError::protocol(format!("Query {handle} has no state")))?;

    let mut snapshot = QueryExecution::new(
        handle.clone(),
        QueryStatus {
            state,
            reason: status.state_change_reason().map(String::from),
        },
    );

    if let Some(stats) = execution.statistics() {
        snapshot = snapshot.with_statistics(QueryStatistics {
            total_execution_time: millis(stats.total_execution_time_in_millis()),
            queue_time: millis(stats.query_queue_time_in_millis()),
            data_scanned_bytes: stats.data_scanned_in_bytes().unwrap_or(0).max(0) as u64,
        });
    }

    if let Some(location) = execution
        .result_configuration()
        .and_then(|c| c.output_location())
    {
        snapshot = snapshot.with_output_location(location);
    }

    Ok(snapshot)
}

fn millis(value: Option<i64>) -> Duration {
    Duration::from_millis(value.unwrap_or(0).max(0) as u64)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// S3-backed artifact store.
#[derive(Debug, Clone)]
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
}

impl S3ArtifactStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn get_object(&self, location: &OutputLocation) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                ReviewError::storage(format!(
                    "Failed to read {location}: {}",
                    aws_sdk_s3::error::DisplayErrorContext(&e)
                ))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| ReviewError::storage(format!("Failed to read body of {location}: {e}")))?
            .into_bytes()
            .to_vec();

        debug!("Read {} bytes from {}", data.len(), location);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_athena::types::{
        QueryExecutionState, QueryExecutionStatistics, QueryExecutionStatus,
    };

    #[test]
    fn test_convert_execution_full() {
        let handle = QueryHandle::new("q-1");
        let execution = aws_sdk_athena::types::QueryExecution::builder()
            .query_execution_id("q-1")
            .status(
                QueryExecutionStatus::builder()
                    .state(QueryExecutionState::Failed)
                    .state_change_reason("Syntax error")
                    .build(),
            )
            .statistics(
                QueryExecutionStatistics::builder()
                    .total_execution_time_in_millis(1500)
                    .query_queue_time_in_millis(250)
                    .data_scanned_in_bytes(2048)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location("s3://bucket/q-1.csv")
                    .build(),
            )
            .build();

        let snapshot = convert_execution(&handle, &execution).unwrap();

        assert_eq!(snapshot.status.state, QueryState::Failed);
        assert_eq!(snapshot.status.reason.as_deref(), Some("Syntax error"));
        let stats = snapshot.statistics.unwrap();
        assert_eq!(stats.total_execution_time, Duration::from_millis(1500));
        assert_eq!(stats.queue_time, Duration::from_millis(250));
        assert_eq!(stats.data_scanned_bytes, 2048);
        assert_eq!(
            snapshot.output_location.as_deref(),
            Some("s3://bucket/q-1.csv")
        );
    }

    #[test]
    fn test_convert_execution_without_status() {
        let handle = QueryHandle::new("q-2");
        let execution = aws_sdk_athena::types::QueryExecution::builder()
            .query_execution_id("q-2")
            .build();

        let err = convert_execution(&handle, &execution).unwrap_err();
        assert!(matches!(err, ReviewError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_sdk_config_uses_static_keys() {
        let config = AthenaConfig {
            region: Some("us-east-1".to_string()),
            access_key_id: Some("AKIAEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..Default::default()
        };

        let sdk_config = load_sdk_config(&config).await.unwrap();

        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("us-east-1"));
        assert!(sdk_config.credentials_provider().is_some());
    }

    #[tokio::test]
    async fn test_sdk_config_rejects_half_a_key_pair() {
        let config = AthenaConfig {
            region: Some("us-east-1".to_string()),
            access_key_id: Some("AKIAEXAMPLE".to_string()),
            ..Default::default()
        };

        let err = load_sdk_config(&config).await.unwrap_err();
        assert!(matches!(err, ReviewError::Config(_)));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("primary"), Some("primary".to_string()));
    }
}
