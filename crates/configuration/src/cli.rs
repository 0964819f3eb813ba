use crate::settings::Config;
use clap::Args;
use std::path::PathBuf;

/// Command-line overrides, applied on top of the file and environment layers.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Trade file to ingest (header line is skipped).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Number of ingestion worker threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Seconds to wait for in-flight trades before giving up.
    #[arg(long)]
    pub drain_timeout_secs: Option<u64>,

    /// Directory the text reports are written to.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Number of accounts kept in the portfolio-value ranking.
    #[arg(long)]
    pub top_n: Option<usize>,

    /// PostgreSQL connection string for persisting results.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl ConfigOverrides {
    /// Writes every provided flag into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(workers) = self.workers {
            config.ingestion.workers = Some(workers);
        }
        if let Some(secs) = self.drain_timeout_secs {
            config.ingestion.drain_timeout_secs = secs;
        }
        if let Some(dir) = &self.output_dir {
            config.reports.output_dir = dir.clone();
        }
        if let Some(top_n) = self.top_n {
            config.reports.top_n = top_n;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
    }
}
