use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::ConfigOverrides;
pub use error::ConfigError;
pub use settings::{
    Config, DatabaseSettings, IngestionSettings, InputSettings, LoggingSettings, ReportSettings,
};

/// Default file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradeledger.toml";

/// Prefix for environment overrides, e.g. `TRADELEDGER__INGESTION__WORKERS=8`.
pub const ENV_PREFIX: &str = "TRADELEDGER";

/// Loads the application configuration.
///
/// Sources are layered from weakest to strongest: built-in defaults, the TOML
/// file (`path`, or `tradeledger.toml` if present), then environment variables.
/// The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .set_default("input.path", "trades.csv")?
        .set_default("ingestion.drain_timeout_secs", 60)?
        .set_default("reports.output_dir", "reports")?
        .set_default("reports.top_n", 5)?
        .set_default("database.max_connections", 10)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("logging.level", "info")?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}
