//! Configuration for the toolkit containers
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration. Containers accept the relevant section through their
//! `from_config` / `with_config` constructors.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_MAX_LOAD_FACTOR, DEFAULT_SERIALIZE_CAPACITY,
    DEFAULT_TABLE_BUCKETS, MAX_LOAD_FACTOR_LIMIT,
};
use crate::types::{Error, Result};

/// Main toolkit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Memory pool configuration
    pub pool: PoolConfig,

    /// Hash table configuration
    pub table: TableConfig,

    /// Serialization buffer configuration
    pub serialize: SerializeConfig,
}

/// Memory pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Size of each backing block in bytes
    pub default_block_size: usize,

    /// Surround allocations with guard bytes checked on free
    pub fence: bool,
}

/// Hash table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Initial bucket count, rounded up to a power of two
    pub initial_buckets: usize,

    /// Entries per bucket above which the table doubles its buckets
    pub max_load_factor: f64,
}

/// Serialization buffer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeConfig {
    /// Bytes reserved when a buffer is created
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_block_size: DEFAULT_BLOCK_SIZE,
            fence: false,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_TABLE_BUCKETS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_SERIALIZE_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Validate the pool section
    pub fn validate(&self) -> Result<()> {
        if self.default_block_size == 0 {
            return Err(Error::illegal_argument("pool.default_block_size must be greater than 0"));
        }
        Ok(())
    }
}

impl TableConfig {
    /// Bucket count actually used: at least one, a power of two
    pub fn bucket_count(&self) -> Result<usize> {
        self.initial_buckets
            .max(1)
            .checked_next_power_of_two()
            .ok_or_else(|| {
                Error::illegal_size(format!(
                    "table.initial_buckets {} has no power of two",
                    self.initial_buckets
                ))
            })
    }

    /// Validate the table section
    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(Error::illegal_argument("table.initial_buckets must be greater than 0"));
        }
        self.bucket_count()?;

        let lf = self.max_load_factor;
        if !(lf > 0.0 && lf <= MAX_LOAD_FACTOR_LIMIT) {
            return Err(Error::illegal_argument(format!(
                "table.max_load_factor must be in (0, {}], got {}",
                MAX_LOAD_FACTOR_LIMIT, lf
            )));
        }
        Ok(())
    }
}

impl ToolkitConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ToolkitConfig = toml::from_str(text)
            .map_err(|e| Error::illegal_argument(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;
        self.table.validate()?;
        Ok(())
    }
}
