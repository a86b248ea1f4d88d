//! # Prime Scan Engine
//!
//! Drives one run through its phases:
//!
//! ```text
//! Idle -> Resolved(start) -> Partitioned -> Scanning -> Aggregating -> Persisted -> Done
//! ```
//!
//! The checkpoint store is read once before partitioning and written once
//! after every worker has finished. Any failure, or a shutdown signal, before
//! `Persisted` ends the run without writing anything, so a failed run can be
//! restarted from the same checkpoint.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::aggregator::{verify_sequence, ResultAggregator};
use crate::checkpoint::{resolve_start, CheckpointStore};
use crate::config::PrimeScanConfig;
use crate::constants::phases;
use crate::error::{PrimeScanError, Result};
use crate::partition::{covered_end, partition, Partition};
use crate::report::{RunReport, WorkerReport};
use crate::worker::{CancellationFlag, ScanWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Resolved,
    Partitioned,
    Scanning,
    Aggregating,
    Persisted,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => phases::IDLE,
            Self::Resolved => phases::RESOLVED,
            Self::Partitioned => phases::PARTITIONED,
            Self::Scanning => phases::SCANNING,
            Self::Aggregating => phases::AGGREGATING,
            Self::Persisted => phases::PERSISTED,
            Self::Done => phases::DONE,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primes and per-worker reports produced by the scanning phase.
struct ScanOutcome {
    primes: Vec<u64>,
    workers: Vec<WorkerReport>,
}

pub struct PrimeScanEngine<S: CheckpointStore + ?Sized> {
    config: PrimeScanConfig,
    store: Arc<S>,
}

impl<S: CheckpointStore + ?Sized> fmt::Debug for PrimeScanEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimeScanEngine")
            .field("config", &self.config)
            .field("store", &self.store.location())
            .finish()
    }
}

impl<S: CheckpointStore + ?Sized + 'static> PrimeScanEngine<S> {
    pub fn new(config: PrimeScanConfig, store: Arc<S>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &PrimeScanConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run to completion and persist the primes found.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_until(std::future::pending()).await
    }

    /// Run until completion or until `shutdown` resolves, whichever is first.
    ///
    /// If `shutdown` wins, workers stop at their next poll and the run ends
    /// with [`PrimeScanError::Cancelled`]; the store is left unchanged.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("prime_scan", run_id = %run_id);
        self.execute(run_id, shutdown).instrument(span).await
    }

    async fn execute<F>(&self, run_id: Uuid, shutdown: F) -> Result<RunReport>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        enter_phase(RunPhase::Idle);

        let (start, last_checkpoint) = resolve_start(self.store.as_ref()).await?;
        enter_phase(RunPhase::Resolved);

        let partitions = partition(start, self.config.batch_size, self.config.worker_count)?;
        let end = covered_end(&partitions).unwrap_or(start);
        info!(
            start,
            end,
            worker_count = partitions.len(),
            batch_size = self.config.batch_size,
            "Partitions assigned"
        );
        enter_phase(RunPhase::Partitioned);

        let cancel = CancellationFlag::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                shutdown.await;
                cancel.cancel();
            }
        });

        enter_phase(RunPhase::Scanning);
        let outcome = self.scan(&partitions, &cancel).await;
        watcher.abort();
        let ScanOutcome { primes, workers } = outcome?;

        if cancel.is_cancelled() {
            warn!(
                discarded = primes.len(),
                "Shutdown requested during scan; checkpoint left unchanged"
            );
            return Err(PrimeScanError::Cancelled);
        }

        enter_phase(RunPhase::Aggregating);
        verify_sequence(last_checkpoint, &primes)?;

        self.store.append_all(&primes).await?;
        enter_phase(RunPhase::Persisted);

        let report = RunReport {
            run_id,
            started_at,
            start,
            end,
            primes_found: primes.len(),
            first_prime: primes.first().copied(),
            last_prime: primes.last().copied(),
            elapsed: clock.elapsed(),
            workers,
        };

        info!(
            start = report.start,
            end = report.end,
            primes_found = report.primes_found,
            last_prime = ?report.last_prime,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Run complete"
        );
        enter_phase(RunPhase::Done);

        Ok(report)
    }

    /// Fan out one blocking worker per partition into a shared channel and
    /// fan the results back in through the aggregator.
    async fn scan(&self, partitions: &[Partition], cancel: &CancellationFlag) -> Result<ScanOutcome> {
        let (sink, receiver) = mpsc::unbounded_channel();
        let aggregator = tokio::spawn(ResultAggregator::new(receiver).collect());

        let handles: Vec<_> = partitions
            .iter()
            .map(|partition| {
                let worker = ScanWorker::new(*partition, self.config.confidence, cancel.clone());
                let sink = sink.clone();
                tokio::task::spawn_blocking(move || worker.scan(&sink))
            })
            .collect();
        // Only worker-held senders remain; the channel closes when the last worker returns.
        drop(sink);

        let settled = settle_workers(handles, cancel).await;

        let primes = aggregator
            .await
            .map_err(|e| PrimeScanError::AggregatorFailed(e.to_string()))?;

        let workers = settled?;
        Ok(ScanOutcome { primes, workers })
    }
}

/// Wait for every worker, in completion order. The first failure raises
/// `cancel` so the remaining workers stop at their next poll.
async fn settle_workers(
    handles: Vec<JoinHandle<Result<WorkerReport>>>,
    cancel: &CancellationFlag,
) -> Result<Vec<WorkerReport>> {
    let mut pending: FuturesUnordered<_> = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| handle.map(move |joined| (index, joined)))
        .collect();

    let mut workers = Vec::with_capacity(pending.len());
    let mut failure = None;
    while let Some((index, joined)) = pending.next().await {
        let error = match joined {
            Ok(Ok(report)) => {
                workers.push(report);
                continue;
            }
            Ok(Err(e)) => e,
            Err(e) => PrimeScanError::WorkerFailed {
                worker: index,
                reason: e.to_string(),
            },
        };
        if failure.is_none() {
            warn!(worker = index, error = %error, "Scan worker failed; stopping the rest");
            cancel.cancel();
            failure = Some(error);
        }
    }

    match failure {
        Some(e) => Err(e),
        None => {
            workers.sort_by_key(|report| report.index);
            Ok(workers)
        }
    }
}

fn enter_phase(phase: RunPhase) {
    info!(phase = %phase, "Run phase transition");
}
