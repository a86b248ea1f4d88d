//! In-memory checkpoint store with optional fault injection.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::CheckpointStore;
use crate::error::{PrimeScanError, Result};

#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    values: Mutex<Vec<u64>>,
    corrupt_tail: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Vec<u64>) -> Self {
        Self {
            values: Mutex::new(values),
            ..Self::default()
        }
    }

    /// Make the trailing record unparseable, as a truncated write would.
    pub fn corrupt_tail<R: Into<String>>(&self, record: R) {
        *self.corrupt_tail.lock() = Some(record.into());
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn values(&self) -> Vec<u64> {
        self.values.lock().clone()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn read_last(&self) -> Result<Option<u64>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PrimeScanError::checkpoint_read(
                self.location(),
                "injected read failure",
            ));
        }
        let corrupt = self.corrupt_tail.lock().clone();
        if let Some(record) = corrupt {
            return Err(PrimeScanError::checkpoint_corrupt(self.location(), record));
        }
        Ok(self.values.lock().last().copied())
    }

    async fn append_all(&self, values: &[u64]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PrimeScanError::checkpoint_write(
                self.location(),
                "injected write failure",
                values.len(),
            ));
        }
        self.values.lock().extend_from_slice(values);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
