//! # Scan Worker
//!
//! Tests every odd candidate of one partition with the primality oracle and
//! pushes each prime into the shared result sink. One worker runs per
//! partition; workers never coordinate with each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::constants::{CANCEL_POLL_INTERVAL, EVEN_PRIME};
use crate::error::{PrimeScanError, Result};
use crate::oracle::is_probably_prime;
use crate::partition::Partition;
use crate::report::WorkerReport;

/// Shared flag raised when a run should stop before persisting anything.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub struct ScanWorker {
    partition: Partition,
    confidence: u32,
    cancel: CancellationFlag,
}

impl ScanWorker {
    pub fn new(partition: Partition, confidence: u32, cancel: CancellationFlag) -> Self {
        Self {
            partition,
            confidence,
            cancel,
        }
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Scan the partition to completion, pushing primes into `sink`.
    ///
    /// Blocking and CPU bound; run it on a blocking thread. Returns early,
    /// with `cancelled` set in the report, once the cancellation flag is seen.
    pub fn scan(&self, sink: &UnboundedSender<u64>) -> Result<WorkerReport> {
        let Partition { index, lo, hi } = self.partition;
        debug!(worker = index, lo, hi, "Scan worker starting");

        let push = |prime: u64| {
            sink.send(prime).map_err(|_| PrimeScanError::WorkerFailed {
                worker: index,
                reason: "result sink closed before the scan finished".to_string(),
            })
        };

        let mut report = WorkerReport::new(&self.partition);

        if self.partition.emits_even_prime() {
            push(EVEN_PRIME)?;
            report.candidates_tested += 1;
            report.primes_found += 1;
        }

        for candidate in self.partition.odd_candidates() {
            if report.candidates_tested % CANCEL_POLL_INTERVAL == 0 && self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            report.candidates_tested += 1;
            if is_probably_prime(candidate, self.confidence) {
                push(candidate)?;
                report.primes_found += 1;
            }
        }

        debug!(
            worker = index,
            candidates_tested = report.candidates_tested,
            primes_found = report.primes_found,
            cancelled = report.cancelled,
            "Scan worker finished"
        );

        Ok(report)
    }
}
