//! Reference data for scan tests.

use std::sync::Arc;

use primescan::{InMemoryCheckpointStore, PrimeScanConfig, PrimeScanEngine};

/// Primes below 100, as persisted by a fresh run over `[0, 100)`.
pub const PRIMES_BELOW_100: [u64; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Primes in `[98, 198)`, as appended by a run resuming after 97.
pub const PRIMES_98_TO_198: [u64; 20] = [
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197,
];

/// Deterministic primality by trial division, for cross-checking the oracle.
pub fn trial_division(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3u64;
    while divisor.saturating_mul(divisor) <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Every prime in `[lo, hi)` by trial division.
pub fn reference_primes(lo: u64, hi: u64) -> Vec<u64> {
    (lo..hi).filter(|&n| trial_division(n)).collect()
}

pub fn scan_config(worker_count: usize, batch_size: u64) -> PrimeScanConfig {
    PrimeScanConfig {
        worker_count,
        batch_size,
        ..Default::default()
    }
}

pub fn memory_engine(
    worker_count: usize,
    batch_size: u64,
    store: Arc<InMemoryCheckpointStore>,
) -> PrimeScanEngine<InMemoryCheckpointStore> {
    PrimeScanEngine::new(scan_config(worker_count, batch_size), store)
        .expect("test configuration is valid")
}
