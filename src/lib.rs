#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # primescan
//!
//! Resumable, partitioned, concurrent prime discovery.
//!
//! ## Overview
//!
//! Each run picks up one past the last prime already persisted, splits the
//! next `worker_count * batch_size` integers into contiguous partitions, tests
//! every odd candidate of each partition on its own blocking thread with a
//! Miller-Rabin oracle, and appends the sorted results to an append-only
//! checkpoint store in a single write.
//!
//! ## Module Organization
//!
//! - [`oracle`] - Probabilistic primality test
//! - [`partition`] - Disjoint, contiguous range assignment
//! - [`worker`] - Per-partition scan loop
//! - [`aggregator`] - Fan-in, ordering and sequence checks
//! - [`checkpoint`] - Store trait, resume resolution, file and memory stores
//! - [`engine`] - Run orchestration and phase transitions
//! - [`report`] - Completion reports
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use primescan::{FileCheckpointStore, PrimeScanConfig, PrimeScanEngine};
//!
//! # async fn example() -> primescan::Result<()> {
//! let config = PrimeScanConfig::default();
//! let store = Arc::new(FileCheckpointStore::new(&config.checkpoint_path));
//! let engine = PrimeScanEngine::new(config, store)?;
//!
//! let report = engine.run().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod partition;
pub mod report;
pub mod worker;

pub use checkpoint::{
    resolve_start, CheckpointStore, FileCheckpointStore, InMemoryCheckpointStore,
};
pub use config::{ConfigManager, ConfigurationError, PrimeScanConfig};
pub use engine::{PrimeScanEngine, RunPhase};
pub use error::{PrimeScanError, Result};
pub use oracle::is_probably_prime;
pub use partition::{partition, Partition};
pub use report::{RunReport, WorkerReport};
pub use worker::{CancellationFlag, ScanWorker};
