//! Configuration schema for the drover exporter
//!
//! The configuration is loaded once at process start and handed to each
//! component's constructor. Nothing reads it from a global.

use drover_core::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main drover configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DroverConfig {
    /// Source database configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Sink stream configuration
    #[serde(default)]
    pub sink: SinkConfig,

    /// Export loop configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Send retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database connection URL (supports environment variable interpolation)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Table to export
    #[serde(default = "default_table")]
    pub table: String,

    /// Custom base query overriding the generated `SELECT * FROM <table>`
    ///
    /// Must not carry its own LIMIT clause; the exporter appends pagination.
    #[serde(default)]
    pub query: Option<String>,

    /// Column ordering the scan, so offset windows are deterministic
    #[serde(default = "default_order_column")]
    pub order_column: String,

    /// Username for sources that authenticate out-of-URL
    /// (supports environment variable interpolation)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for sources that authenticate out-of-URL
    /// (supports environment variable interpolation)
    #[serde(default)]
    pub password: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://drover.db".to_string()
}

fn default_table() -> String {
    "records".to_string()
}

fn default_order_column() -> String {
    "id".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            table: default_table(),
            query: None,
            order_column: default_order_column(),
            username: None,
            password: None,
        }
    }
}

/// Sink stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Directory the file-stream transport writes partition files into
    #[serde(default = "default_sink_directory")]
    pub directory: String,

    /// Topic name, used as the partition file prefix
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Producer identity reported when the transport opens
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Number of partitions records are hashed across
    #[serde(default = "default_partitions")]
    pub partitions: u32,
}

fn default_sink_directory() -> String {
    "out".to_string()
}

fn default_topic() -> String {
    "records".to_string()
}

fn default_client_id() -> String {
    "drover-exporter".to_string()
}

fn default_partitions() -> u32 {
    4
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            directory: default_sink_directory(),
            topic: default_topic(),
            client_id: default_client_id(),
            partitions: default_partitions(),
        }
    }
}

/// Export loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Records fetched per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Target record count, the loop's stopping criterion
    #[serde(default = "default_total_records")]
    pub total_records: u64,

    /// Checkpoint file path
    #[serde(default = "default_checkpoint_file")]
    pub checkpoint_file: String,
}

fn default_batch_size() -> usize {
    10_000
}

fn default_total_records() -> u64 {
    6_000_000
}

fn default_checkpoint_file() -> String {
    "checkpoint.json".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            total_records: default_total_records(),
            checkpoint_file: default_checkpoint_file(),
        }
    }
}

/// Send retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts per record send
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, grows linearly per attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Upper bound on the backoff delay in milliseconds
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Seconds to wait for a send acknowledgment before treating it as failed
    #[serde(default = "default_ack_timeout_secs")]
    pub ack_timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_ms() -> u64 {
    1_000
}

fn default_backoff_cap_ms() -> u64 {
    10_000
}

fn default_ack_timeout_secs() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            ack_timeout_secs: default_ack_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl DroverConfig {
    /// Load configuration from a TOML file
    ///
    /// Resolves `${VAR}` references and validates the result.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExportError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;

        let mut config: DroverConfig = toml::from_str(&text)
            .map_err(|e| ExportError::Config(format!("Invalid config file: {}", e)))?;

        config.resolve_env_vars();
        config.validate()?;
        Ok(config)
    }

    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in string fields
    pub fn resolve_env_vars(&mut self) {
        self.source.database_url = Self::expand_env_var(&self.source.database_url);

        if let Some(ref username) = self.source.username {
            self.source.username = Some(Self::expand_env_var(username));
        }

        if let Some(ref password) = self.source.password {
            self.source.password = Some(Self::expand_env_var(password));
        }
    }

    /// Expand environment variable in a string
    ///
    /// Supports ${VAR_NAME} syntax
    fn expand_env_var(value: &str) -> String {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            std::env::var(var_name).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }

    /// Reject configurations the exporter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.export.batch_size == 0 {
            return Err(ExportError::Config(
                "export.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_retries == 0 {
            return Err(ExportError::Config(
                "retry.max_retries must be greater than 0".to_string(),
            ));
        }

        if self.retry.backoff_cap_ms < self.retry.backoff_ms {
            return Err(ExportError::Config(
                "retry.backoff_cap_ms must not be lower than retry.backoff_ms".to_string(),
            ));
        }

        if self.sink.partitions == 0 {
            return Err(ExportError::Config(
                "sink.partitions must be greater than 0".to_string(),
            ));
        }

        if let Some(ref query) = self.source.query {
            // Pagination is appended to the base query; a second LIMIT
            // clause would silently truncate every batch.
            if query.to_lowercase().contains("limit") {
                return Err(ExportError::Config(
                    "source.query must not contain a LIMIT clause".to_string(),
                ));
            }
        }

        Ok(())
    }
}
