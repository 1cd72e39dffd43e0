//! athena-review - run Athena queries and load their results for review.

use athena_review::athena::{self, MockArtifactStore, MockQueryService, ServiceClients};
use athena_review::cli::Cli;
use athena_review::config::{AthenaConfig, Config};
use athena_review::error::{Result, ReviewError};
use athena_review::logging;
use athena_review::output;
use athena_review::query::{AuditLogListener, ListenerRegistry, QueryRunner, ResultTable};
use athena_review::review::ReviewSession;
use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{error, info};

/// Output location used by `--mock` when none is configured.
const MOCK_OUTPUT_LOCATION: &str = "s3://mock-bucket/results/";

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    match cli.log_path() {
        Some(path) => {
            if let Err(e) = logging::init_file_logging(&path) {
                eprintln!("{}: {}", e.category(), e);
                std::process::exit(1);
            }
        }
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        let code = if e.is_terminal_query_state() { 2 } else { 1 };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.parse_output_format().map_err(ReviewError::config)?;

    // Precedence: CLI arguments, then config file, then environment
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.athena.merge(&cli.to_athena_config());
    config.athena.apply_env_defaults();

    if cli.mock && config.athena.output_location.is_none() {
        config.athena.output_location = Some(MOCK_OUTPUT_LOCATION.to_string());
    }

    info!("Athena: {}", config.athena.display_string());
    let clients = service_clients(&cli, &config.athena).await?;

    let mut listeners = ListenerRegistry::with_policy(config.athena.listener_failures);
    listeners.register(AuditLogListener);
    let runner = QueryRunner::new(clients.queries, clients.artifacts, listeners);

    let table = match cli.sql.as_deref() {
        Some(sql) if cli.rows => {
            let request = config.athena.request(sql)?;
            let execution = runner.run(&request).await?;
            let fetched = runner
                .fetch_rows(&execution.handle, !cli.no_header)
                .try_collect::<Vec<_>>()
                .await?;
            ResultTable::from_fetched(fetched)
        }
        Some(sql) => {
            let request = config.athena.request(sql)?;
            runner.query_table(&request).await?
        }
        None => {
            let mut session = ReviewSession::new(runner, config.athena, config.review);
            session.load(false).await?
        }
    };

    print!("{}", output::render(&table, format)?);
    Ok(())
}

async fn service_clients(cli: &Cli, config: &AthenaConfig) -> Result<ServiceClients> {
    if cli.mock {
        info!("Using mock query service");
        return Ok(ServiceClients {
            queries: Arc::new(MockQueryService::demo()),
            artifacts: Arc::new(MockArtifactStore::demo()),
        });
    }
    athena::connect(config).await
}
