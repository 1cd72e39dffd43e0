//! Configuration management for athena-review.
//!
//! Handles loading configuration from TOML files and environment variables:
//! where queries run (`[athena]`) and what gets reviewed (`[review]`).

use crate::athena::QueryRequest;
use crate::error::{Result, ReviewError};
use crate::query::ListenerFailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default data catalog.
pub const DEFAULT_CATALOG: &str = "AwsDataCatalog";

/// Default database queries run in.
pub const DEFAULT_DATABASE: &str = "default";

/// Default work group.
pub const DEFAULT_WORKGROUP: &str = "primary";

/// Default polling budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Main configuration structure for athena-review.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query service settings.
    #[serde(default)]
    pub athena: AthenaConfig,

    /// Review session settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

/// Query service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// AWS region (e.g., "us-east-1").
    pub region: Option<String>,

    /// Database queries run in.
    pub database: Option<String>,

    /// Data catalog.
    pub catalog: Option<String>,

    /// Work group.
    pub workgroup: Option<String>,

    /// S3 URI results are written to (e.g., "s3://bucket/athena-results/").
    pub output_location: Option<String>,

    /// Polling budget in seconds. Unset means `DEFAULT_TIMEOUT_SECS`.
    pub timeout_secs: Option<u64>,

    /// What a failing submission listener does to the query.
    #[serde(default)]
    pub listener_failures: ListenerFailurePolicy,

    /// Static access key (not recommended to store in config).
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<String>,

    /// Static secret key (not recommended to store in config).
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,
}


/// Review session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Table or view reviewed by default (`database.view` or just `view`).
    pub view: Option<String>,

    /// Column appended to loaded results for the operator's notes.
    #[serde(default = "default_annotation_column")]
    pub annotation_column: String,

    /// How long a loaded result stays cached. Unset means until refreshed.
    pub cache_ttl_secs: Option<u64>,
}

fn default_annotation_column() -> String {
    "reason".to_string()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            view: None,
            annotation_column: default_annotation_column(),
            cache_ttl_secs: None,
        }
    }
}

impl ReviewConfig {
    /// Returns the cache time-to-live, if configured.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

impl AthenaConfig {
    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn catalog(&self) -> &str {
        self.catalog.as_deref().unwrap_or(DEFAULT_CATALOG)
    }

    pub fn workgroup(&self) -> &str {
        self.workgroup.as_deref().unwrap_or(DEFAULT_WORKGROUP)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Builds a request for `query` from these settings.
    pub fn request(&self, query: impl Into<String>) -> Result<QueryRequest> {
        let output_location = self.output_location.as_deref().ok_or_else(|| {
            ReviewError::config(
                "No output location configured. Set athena.output_location or ATHENA_OUTPUT_LOCATION",
            )
        })?;

        Ok(QueryRequest::new(query)
            .with_database(self.database())
            .with_catalog(self.catalog())
            .with_output_location(output_location)
            .with_workgroup(self.workgroup())
            .with_timeout(self.timeout()))
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &AthenaConfig) {
        if other.region.is_some() {
            self.region = other.region.clone();
        }
        if other.database.is_some() {
            self.database = other.database.clone();
        }
        if other.catalog.is_some() {
            self.catalog = other.catalog.clone();
        }
        if other.workgroup.is_some() {
            self.workgroup = other.workgroup.clone();
        }
        if other.output_location.is_some() {
            self.output_location = other.output_location.clone();
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.access_key_id.is_some() {
            self.access_key_id = other.access_key_id.clone();
        }
        if other.secret_access_key.is_some() {
            self.secret_access_key = other.secret_access_key.clone();
        }
    }

    /// Applies environment variables (AWS_REGION, ATHENA_DATABASE, etc.) as defaults.
    pub fn apply_env_defaults(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Fills unset fields from `lookup`.
    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.region.is_none() {
            self.region = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION"));
        }
        if self.database.is_none() {
            self.database = lookup("ATHENA_DATABASE");
        }
        if self.catalog.is_none() {
            self.catalog = lookup("ATHENA_CATALOG");
        }
        if self.workgroup.is_none() {
            self.workgroup = lookup("ATHENA_WORKGROUP");
        }
        if self.output_location.is_none() {
            self.output_location = lookup("ATHENA_OUTPUT_LOCATION");
        }
        // Keys as written in the review tool's .env file. Uppercase
        // AWS_ACCESS_KEY_ID is picked up by the SDK's own provider chain.
        if self.access_key_id.is_none() {
            self.access_key_id = lookup("aws_access_key_id");
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = lookup("aws_secret_access_key");
        }
    }

    /// Returns a display-safe string (no credentials) for log output.
    pub fn display_string(&self) -> String {
        let region = self.region.as_deref().unwrap_or("default region");
        format!("{} @ {} ({})", self.database(), region, self.workgroup())
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("athena-review")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ReviewError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ReviewError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
