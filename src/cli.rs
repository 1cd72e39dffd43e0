//! Command-line argument parsing for athena-review.
//!
//! Uses clap to parse CLI arguments.

use crate::config::AthenaConfig;
use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Run an Athena query and print its results for review.
#[derive(Parser, Debug)]
#[command(name = "athena-review")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL to run. Without it, the configured review view is loaded.
    #[arg(value_name = "SQL")]
    pub sql: Option<String>,

    /// AWS region
    #[arg(short = 'r', long, value_name = "REGION")]
    pub region: Option<String>,

    /// Database queries run in
    #[arg(short = 'd', long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// Work group
    #[arg(short = 'w', long, value_name = "WORKGROUP")]
    pub workgroup: Option<String>,

    /// S3 URI query results are written to
    #[arg(short = 'o', long, value_name = "S3_URI")]
    pub output_location: Option<String>,

    /// Seconds to wait for the query before giving up
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: text, csv, or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Stream the paginated results of SQL instead of reading the CSV artifact
    #[arg(long, requires = "sql")]
    pub rows: bool,

    /// With --rows, keep the first row as data instead of using it as the header
    #[arg(long, requires = "rows")]
    pub no_header: bool,

    /// Write logs to a file (default location if PATH is omitted)
    #[arg(long, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Use the in-memory mock service (for testing)
    #[arg(long)]
    pub mock: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to an AthenaConfig overlay.
    ///
    /// Only the fields given on the command line are set.
    pub fn to_athena_config(&self) -> AthenaConfig {
        AthenaConfig {
            region: self.region.clone(),
            database: self.database.clone(),
            workgroup: self.workgroup.clone(),
            output_location: self.output_location.clone(),
            timeout_secs: self.timeout,
            ..Default::default()
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.format.parse()
    }

    /// Returns the log file to write to, if file logging was requested.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(crate::logging::default_log_path))
    }
}
