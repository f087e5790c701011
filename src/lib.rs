//! dutil - command line front end for the pooled data-structure toolkit
//!
//! Loads configuration, initializes logging and runs the subcommands that
//! exercise [`dutil_core`]: file checksums, sealed pack/unpack and graph
//! path enumeration.
#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod graph_file;

pub use config::AppConfig;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing; `RUST_LOG` takes precedence over the configured level
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Initializing {} v{}", NAME, VERSION);
    Ok(())
}
