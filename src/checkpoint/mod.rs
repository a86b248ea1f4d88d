//! # Checkpoint Store
//!
//! Durable record of every prime persisted so far. The engine reads the last
//! value once before partitioning and appends the new run's sorted primes once
//! after every worker has finished; it never touches the store in between.
//!
//! Stores are injected into the engine, so tests can swap the on-disk
//! [`FileCheckpointStore`] for an [`InMemoryCheckpointStore`].

pub mod file;
pub mod memory;

use async_trait::async_trait;
use tracing::info;

use crate::constants::DOMAIN_ORIGIN;
use crate::error::{PrimeScanError, Result};

pub use file::FileCheckpointStore;
pub use memory::InMemoryCheckpointStore;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Most recently persisted prime, or `None` when nothing has been stored.
    ///
    /// Fails with `CheckpointCorrupt` when the trailing record exists but does
    /// not parse, and with `CheckpointRead` when the storage is unreadable.
    async fn read_last(&self) -> Result<Option<u64>>;

    /// Append `values` in order after the existing records.
    ///
    /// A crash part way through may leave a prefix of `values` appended, but
    /// never reorders them.
    async fn append_all(&self, values: &[u64]) -> Result<()>;

    /// Human readable location used in diagnostics.
    fn location(&self) -> String;
}

/// Resume offset for the next run: one past the last persisted prime, or the
/// domain origin for an empty store.
pub async fn resolve_start<S: CheckpointStore + ?Sized>(store: &S) -> Result<(u64, Option<u64>)> {
    let last = store.read_last().await?;
    let start = match last {
        None => DOMAIN_ORIGIN,
        Some(value) => value.checked_add(1).ok_or_else(|| {
            PrimeScanError::InvalidParameter(format!(
                "checkpoint {value} at {} leaves no integers to scan",
                store.location()
            ))
        })?,
    };

    info!(
        location = %store.location(),
        last_checkpoint = ?last,
        start,
        "Resolved resume offset"
    );

    Ok((start, last))
}
