//! Review session integration tests.

use athena_review::athena::{MockArtifactStore, MockQueryService};
use athena_review::config::Config;
use athena_review::output::{render, OutputFormat};
use athena_review::query::{ListenerRegistry, QueryRunner};
use athena_review::review::ReviewSession;
use std::sync::Arc;
use std::time::Duration;

const CONFIG: &str = r#"
[athena]
region = "us-east-1"
database = "npi_registry"
output_location = "s3://review-bucket/results/"
timeout_secs = 120

[review]
view = "distinct_slug_orgs"
annotation_column = "notes"
cache_ttl_secs = 600
"#;

fn session(service: Arc<MockQueryService>) -> ReviewSession {
    let config: Config = toml::from_str(CONFIG).unwrap();
    let runner = QueryRunner::new(
        service,
        Arc::new(MockArtifactStore::demo()),
        ListenerRegistry::with_policy(config.athena.listener_failures),
    );
    ReviewSession::new(runner, config.athena, config.review)
}

#[tokio::test(start_paused = true)]
async fn test_review_from_config_file() {
    let service = Arc::new(MockQueryService::demo());
    let mut session = session(Arc::clone(&service));

    let table = session.load(false).await.unwrap();

    let submitted = service.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0].query,
        "SELECT * FROM npi_registry.distinct_slug_orgs"
    );
    assert_eq!(submitted[0].timeout, Duration::from_secs(120));
    assert_eq!(table.column_index("notes"), Some(3));

    let csv = render(&table, OutputFormat::Csv).unwrap();
    assert!(csv.starts_with("name,npi,affiliate,notes\n"));
}

#[tokio::test(start_paused = true)]
async fn test_cached_result_expires_after_ttl() {
    let service = Arc::new(MockQueryService::new());
    let mut session = session(Arc::clone(&service));

    session.load(false).await.unwrap();
    tokio::time::advance(Duration::from_secs(300)).await;
    session.load(false).await.unwrap();
    assert_eq!(service.submitted().len(), 1);

    tokio::time::advance(Duration::from_secs(301)).await;
    session.load(false).await.unwrap();
    assert_eq!(service.submitted().len(), 2);
}
