use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputSettings,
    pub ingestion: IngestionSettings,
    pub reports: ReportSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Where the trade batch is read from.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    /// Delimited trade file; the first line is a header.
    pub path: PathBuf,
}

/// Parameters for the ingestion worker pool.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionSettings {
    /// Worker thread count. `None` means one per available core.
    pub workers: Option<usize>,
    /// How long `drain` waits for outstanding trades before giving up.
    pub drain_timeout_secs: u64,
}

impl IngestionSettings {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    /// The configured worker count, or the machine's available parallelism.
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    /// How many accounts the portfolio-value ranking keeps.
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string. Without one, results are kept in memory only.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Rejects settings the rest of the system cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingestion.workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "ingestion.workers must be greater than 0".to_string(),
            ));
        }
        if self.ingestion.drain_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ingestion.drain_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.reports.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "reports.top_n must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        if self.input.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "input.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
