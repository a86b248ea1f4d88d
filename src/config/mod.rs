//! # Scan Configuration
//!
//! Worker count, batch width, oracle confidence and checkpoint location for a
//! run. Values come from built-in defaults, then an optional TOML file, then
//! `PRIMESCAN_*` environment variables; see [`ConfigManager`].
//!
//! ```rust,no_run
//! use primescan::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load(None)?;
//! let config = manager.config();
//! println!("{} workers x {} per batch", config.worker_count, config.batch_size);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CHECKPOINT_PATH, DEFAULT_CONFIDENCE, DEFAULT_TAIL_WINDOW,
    DEFAULT_WORKER_COUNT,
};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimeScanConfig {
    /// Number of partitions, and so of concurrent scan workers
    pub worker_count: usize,

    /// Width of each partition
    pub batch_size: u64,

    /// Miller-Rabin rounds per candidate
    pub confidence: u32,

    /// Line-delimited checkpoint file
    pub checkpoint_path: PathBuf,

    /// Initial number of bytes read from the end of the checkpoint file
    pub tail_window: u64,
}

impl Default for PrimeScanConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            confidence: DEFAULT_CONFIDENCE,
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            tail_window: DEFAULT_TAIL_WINDOW,
        }
    }
}

impl PrimeScanConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker_count",
                self.worker_count,
                "must be greater than zero",
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "batch_size",
                self.batch_size,
                "must be greater than zero",
            ));
        }
        if self.confidence == 0 {
            return Err(ConfigurationError::invalid_value(
                "confidence",
                self.confidence,
                "at least one Miller-Rabin round is required",
            ));
        }
        if self.tail_window == 0 {
            return Err(ConfigurationError::invalid_value(
                "tail_window",
                self.tail_window,
                "must be greater than zero",
            ));
        }
        if self.checkpoint_path.as_os_str().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "checkpoint_path",
                "",
                "must not be empty",
            ));
        }
        if self.span().is_none() {
            return Err(ConfigurationError::invalid_value(
                "batch_size",
                self.batch_size,
                format!(
                    "{} workers x {} overflows the integer domain",
                    self.worker_count, self.batch_size
                ),
            ));
        }
        Ok(())
    }

    /// Integers covered by one run, if representable.
    pub fn span(&self) -> Option<u64> {
        u64::try_from(self.worker_count)
            .ok()?
            .checked_mul(self.batch_size)
    }
}
