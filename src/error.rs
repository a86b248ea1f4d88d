//! Error types for the prime scanning engine.
//!
//! Every variant is fatal to the run that produced it. None of them are
//! retried inside the engine: a failed run leaves the checkpoint store exactly
//! as it found it and can simply be started again.

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrimeScanError {
    #[error("Checkpoint corrupt at {location}: trailing record {record:?} is not a valid integer")]
    CheckpointCorrupt { location: String, record: String },

    #[error("Checkpoint read failed at {location}: {reason}")]
    CheckpointRead { location: String, reason: String },

    #[error("Checkpoint write failed at {location}: {reason} ({discarded} primes from this run discarded)")]
    CheckpointWrite {
        location: String,
        reason: String,
        discarded: usize,
    },

    #[error("Range overflow: start {start} + {worker_count} x {batch_size} exceeds u64")]
    RangeOverflow {
        start: u64,
        batch_size: u64,
        worker_count: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Ordering violation: {next} does not follow {previous}")]
    OrderingViolation { previous: u64, next: u64 },

    #[error("Scan worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    #[error("Result aggregator failed: {0}")]
    AggregatorFailed(String),

    #[error("Run cancelled before persistence")]
    Cancelled,

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl PrimeScanError {
    pub fn checkpoint_corrupt<L: Into<String>, R: Into<String>>(location: L, record: R) -> Self {
        Self::CheckpointCorrupt {
            location: location.into(),
            record: record.into(),
        }
    }

    pub fn checkpoint_read<L: Into<String>, E: std::fmt::Display>(location: L, error: E) -> Self {
        Self::CheckpointRead {
            location: location.into(),
            reason: error.to_string(),
        }
    }

    pub fn checkpoint_write<L: Into<String>, E: std::fmt::Display>(
        location: L,
        error: E,
        discarded: usize,
    ) -> Self {
        Self::CheckpointWrite {
            location: location.into(),
            reason: error.to_string(),
            discarded,
        }
    }

    /// Whether the error happened before any scanning work was done.
    pub fn is_pre_scan(&self) -> bool {
        matches!(
            self,
            Self::CheckpointCorrupt { .. }
                | Self::CheckpointRead { .. }
                | Self::RangeOverflow { .. }
                | Self::InvalidParameter(_)
                | Self::Configuration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PrimeScanError>;
