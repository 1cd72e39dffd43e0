//! Query runner integration tests.
//!
//! Exercises submit, poll and fetch end to end through the public API.

use athena_review::athena::{
    rows_to_csv, FetchedRow, MockArtifactStore, MockQueryService, QueryRequest, QueryState,
    QueryStatus,
};
use athena_review::error::ReviewError;
use athena_review::query::{ListenerFailurePolicy, ListenerRegistry, QueryRunner, ResultTable};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_err;

fn request(timeout_secs: u64) -> QueryRequest {
    QueryRequest::new("SELECT name, npi FROM npi_registry.distinct_slug_orgs")
        .with_database("npi_registry")
        .with_output_location("s3://review-bucket/results/")
        .with_timeout(Duration::from_secs(timeout_secs))
}

fn cells(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[tokio::test(start_paused = true)]
async fn test_query_table_reads_artifact_at_output_location() {
    let rows = vec![cells(&["name", "npi"]), cells(&["compass oncology", "1427051473"])];
    let service = Arc::new(
        MockQueryService::new().with_states([QueryState::Running, QueryState::Succeeded]),
    );
    let store = Arc::new(MockArtifactStore::new().with_object(
        "review-bucket",
        "results/mock-query-1.csv",
        rows_to_csv(&rows),
    ));
    let runner = QueryRunner::new(service.clone(), store.clone(), ListenerRegistry::new());

    let table = runner.query_table(&request(60)).await.unwrap();

    assert_eq!(table.columns(), &["name".to_string(), "npi".to_string()]);
    assert_eq!(table.column("npi").unwrap(), vec![Some("1427051473")]);
    assert_eq!(store.requested().len(), 1);
    assert_eq!(service.status_calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_query_reports_reason() {
    let service = Arc::new(MockQueryService::new().with_statuses([
        Some(QueryStatus::new(QueryState::Queued)),
        Some(QueryStatus::new(QueryState::Failed).with_reason("TABLE_NOT_FOUND: line 1:15")),
    ]));
    let runner = QueryRunner::new(
        service,
        Arc::new(MockArtifactStore::demo()),
        ListenerRegistry::new(),
    );

    let err = assert_err!(runner.query_table(&request(60)).await);

    assert!(err.is_terminal_query_state());
    assert!(err.to_string().contains("TABLE_NOT_FOUND"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_stops_polling() {
    let service = Arc::new(MockQueryService::new().with_states([QueryState::Running]));
    let runner = QueryRunner::new(
        service.clone(),
        Arc::new(MockArtifactStore::demo()),
        ListenerRegistry::new(),
    );

    let err = assert_err!(runner.run(&request(12)).await);

    assert!(matches!(err, ReviewError::Timeout(t) if t == Duration::from_secs(12)));
    // Polls at 1s, 2s, 3s, 4s, 5s, then the last wait is cut to the budget.
    assert_eq!(service.status_calls().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_rows_streams_named_records() {
    let runner = QueryRunner::new(
        Arc::new(MockQueryService::demo()),
        Arc::new(MockArtifactStore::demo()),
        ListenerRegistry::new(),
    );

    let execution = runner.run(&request(60)).await.unwrap();
    let fetched: Vec<FetchedRow> = runner
        .fetch_rows(&execution.handle, true)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(fetched.len(), 3);
    let FetchedRow::Record(first) = &fetched[0] else {
        panic!("expected a named record");
    };
    assert_eq!(first.get("name"), Some("compass oncology"));

    let table = ResultTable::from_fetched(fetched);
    assert_eq!(table.column_index("affiliate"), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_listener_sees_query_and_can_block_it() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut listeners = ListenerRegistry::new();
    listeners.register_fn(move |query: &str| {
        sink.lock().unwrap().push(query.to_string());
        Ok(())
    });
    listeners.register_fn(|_: &str| Err("audit store offline".into()));

    let runner = QueryRunner::new(
        Arc::new(MockQueryService::demo()),
        Arc::new(MockArtifactStore::demo()),
        listeners,
    );

    let err = assert_err!(runner.run(&request(60)).await);
    assert!(matches!(err, ReviewError::Listener { .. }));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_isolated_listener_failure_does_not_block_query() {
    let mut listeners = ListenerRegistry::with_policy(ListenerFailurePolicy::Isolate);
    listeners.register_fn(|_: &str| Err("audit store offline".into()));

    let runner = QueryRunner::new(
        Arc::new(MockQueryService::demo()),
        Arc::new(MockArtifactStore::demo()),
        listeners,
    );

    let table = runner.query_table(&request(60)).await.unwrap();
    assert_eq!(table.len(), 3);
}
