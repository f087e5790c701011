//! Ambient support: configuration, diagnostics and shared access

/// Toolkit configuration
pub mod config;

/// Feature-gated debug diagnostics
pub mod logging;

/// Mutex-guarded shared handles
pub mod sync;

pub use config::{PoolConfig, SerializeConfig, TableConfig, ToolkitConfig};
pub use sync::Shared;
