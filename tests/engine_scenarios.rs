//! End-to-end runs of the engine against in-memory and on-disk stores.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::*;
use primescan::{
    CheckpointStore, FileCheckpointStore, InMemoryCheckpointStore, PrimeScanEngine,
    PrimeScanError,
};

#[tokio::test]
async fn fresh_store_single_worker_persists_primes_below_100() {
    let store = Arc::new(InMemoryCheckpointStore::new());
    let report = memory_engine(1, 100, store.clone()).run().await.unwrap();

    assert_eq!(store.values(), PRIMES_BELOW_100.to_vec());
    assert_eq!((report.start, report.end), (0, 100));
    assert_eq!(report.primes_found, 25);
    assert_eq!(report.workers.len(), 1);
}

#[tokio::test]
async fn resume_after_97_appends_next_span() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![97]));
    let report = memory_engine(1, 100, store.clone()).run().await.unwrap();

    assert_eq!((report.start, report.end), (98, 198));
    let mut expected = vec![97];
    expected.extend_from_slice(&PRIMES_98_TO_198);
    assert_eq!(store.values(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn partition_edges_neither_skip_nor_duplicate() {
    // Edges at 25, 50 and 75 sit next to primes 23, 29, 47, 53, 73 and 79.
    let store = Arc::new(InMemoryCheckpointStore::new());
    let report = memory_engine(4, 25, store.clone()).run().await.unwrap();

    assert_eq!(store.values(), PRIMES_BELOW_100.to_vec());
    let per_worker: u64 = report.workers.iter().map(|w| w.primes_found).sum();
    assert_eq!(per_worker, 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_runs_match_one_combined_run() {
    let split = Arc::new(InMemoryCheckpointStore::new());
    memory_engine(2, 50, split.clone()).run().await.unwrap();
    memory_engine(2, 50, split.clone()).run().await.unwrap();

    // First run covers [0, 100) and ends on 97, so the second covers [98, 198).
    let combined = Arc::new(InMemoryCheckpointStore::new());
    memory_engine(2, 99, combined.clone()).run().await.unwrap();

    assert_eq!(split.values(), combined.values());
    assert_eq!(split.values(), reference_primes(0, 198));
}

#[tokio::test]
async fn store_history_stays_strictly_increasing() {
    let store = Arc::new(InMemoryCheckpointStore::new());
    for _ in 0..5 {
        memory_engine(3, 40, store.clone()).run().await.unwrap();
    }

    let values = store.values();
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
    let unique: BTreeSet<_> = values.iter().collect();
    assert_eq!(unique.len(), values.len());
    assert_eq!(values, reference_primes(0, *values.last().unwrap() + 1));
}

#[tokio::test]
async fn resume_at_one_includes_two_exactly_once() {
    // Partitions [1, 6) and [6, 11).
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![0]));
    memory_engine(2, 5, store.clone()).run().await.unwrap();

    assert_eq!(store.values(), vec![0, 2, 3, 5, 7]);
}

#[tokio::test]
async fn spans_ending_at_or_below_two_still_advance() {
    for (workers, batch) in [(1, 1), (1, 2), (2, 1)] {
        let store = Arc::new(InMemoryCheckpointStore::new());
        let report = memory_engine(workers, batch, store.clone()).run().await.unwrap();
        assert_eq!(report.start, 0);
        assert_eq!(store.values(), vec![2], "{workers} x {batch}");

        // The next run resumes past 2 instead of rescanning the origin.
        let report = memory_engine(workers, batch, store.clone()).run().await.unwrap();
        assert_eq!(report.start, 3);
        assert_eq!(store.values(), vec![2, 3], "{workers} x {batch}");
    }
}

#[tokio::test]
async fn resume_at_two_emits_two_once() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![1]));
    memory_engine(3, 1, store.clone()).run().await.unwrap();

    assert_eq!(store.values(), vec![1, 2, 3]);
}

#[tokio::test]
async fn resume_above_three_never_emits_two() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![3]));
    memory_engine(1, 20, store.clone()).run().await.unwrap();

    assert_eq!(store.values(), vec![3, 5, 7, 11, 13, 17, 19, 23]);
}

#[tokio::test]
async fn torn_checkpoint_file_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("primes.csv");
    std::fs::write(&path, "89\n97\n10").unwrap();
    let store = Arc::new(FileCheckpointStore::new(&path));
    let engine = PrimeScanEngine::new(scan_config(1, 20), store).unwrap();

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, PrimeScanError::CheckpointCorrupt { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "89\n97\n10");
}

#[tokio::test]
async fn corrupt_checkpoint_aborts_before_scanning() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![2, 3]));
    store.corrupt_tail("5x");

    let err = memory_engine(1, 100, store.clone()).run().await.unwrap_err();
    assert!(matches!(err, PrimeScanError::CheckpointCorrupt { .. }));
    assert!(err.is_pre_scan());
    assert_eq!(store.values(), vec![2, 3]);
}

#[tokio::test]
async fn unreadable_checkpoint_aborts_before_scanning() {
    let store = Arc::new(InMemoryCheckpointStore::new());
    store.fail_reads(true);

    let err = memory_engine(1, 100, store.clone()).run().await.unwrap_err();
    assert!(matches!(err, PrimeScanError::CheckpointRead { .. }));
}

#[tokio::test]
async fn write_failure_discards_the_whole_run() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![97]));
    store.fail_writes(true);

    let err = memory_engine(1, 100, store.clone()).run().await.unwrap_err();
    assert!(matches!(
        err,
        PrimeScanError::CheckpointWrite { discarded: 20, .. }
    ));
    assert_eq!(store.values(), vec![97]);

    // The next attempt resumes from the same checkpoint.
    store.fail_writes(false);
    memory_engine(1, 100, store.clone()).run().await.unwrap();
    assert_eq!(store.values().len(), 21);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_leaves_store_unchanged() {
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![97]));
    let engine = memory_engine(2, 50_000_000, store.clone());

    let err = engine.run_until(async {}).await.unwrap_err();
    assert!(matches!(err, PrimeScanError::Cancelled));
    assert_eq!(store.values(), vec![97]);
}

#[tokio::test]
async fn resumes_past_the_signed_word_limit() {
    let below = 9_223_372_036_854_775_783u64;
    let store = Arc::new(InMemoryCheckpointStore::with_values(vec![below]));
    let report = memory_engine(2, 50, store.clone()).run().await.unwrap();

    assert_eq!(report.start, below + 1);
    assert_eq!(report.first_prime, Some(9_223_372_036_854_775_837));
    let values = store.values();
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn file_store_round_trip_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("primes.csv");
    let store = Arc::new(FileCheckpointStore::new(&path));

    let config = scan_config(1, 100);
    let engine = PrimeScanEngine::new(config.clone(), store.clone()).unwrap();
    engine.run().await.unwrap();
    assert_eq!(store.read_last().await.unwrap(), Some(97));

    let engine = PrimeScanEngine::new(config, store.clone()).unwrap();
    let report = engine.run().await.unwrap();
    assert_eq!(report.start, 98);

    let contents = std::fs::read_to_string(&path).unwrap();
    let persisted: Vec<u64> = contents.lines().map(|l| l.parse().unwrap()).collect();
    let mut expected = PRIMES_BELOW_100.to_vec();
    expected.extend_from_slice(&PRIMES_98_TO_198);
    assert_eq!(persisted, expected);
}
