//! # Scan Constants
//!
//! Defaults for a scan run and fixed facts about the integer domain.

/// First integer of the searchable domain. An empty checkpoint resumes here.
pub const DOMAIN_ORIGIN: u64 = 0;

/// The only even prime.
pub const EVEN_PRIME: u64 = 2;

/// Smallest odd prime; scanning of odd candidates never starts below it.
pub const FIRST_ODD_PRIME: u64 = 3;

/// Width of each worker's partition.
pub const DEFAULT_BATCH_SIZE: u64 = 1_000_000;

/// Number of concurrent scan workers.
pub const DEFAULT_WORKER_COUNT: usize = 9;

/// Miller-Rabin rounds per candidate; false positive bound is 4^-confidence.
pub const DEFAULT_CONFIDENCE: u32 = 20;

/// Default location of the line-delimited checkpoint file.
pub const DEFAULT_CHECKPOINT_PATH: &str = "primes.csv";

/// Bytes read from the end of the checkpoint file when looking for the last record.
pub const DEFAULT_TAIL_WINDOW: u64 = 512;

/// Workers poll the cancellation flag once per this many candidates.
pub const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PRIMESCAN";

/// Run phases, in the order a successful run passes through them.
pub mod phases {
    pub const IDLE: &str = "idle";
    pub const RESOLVED: &str = "resolved";
    pub const PARTITIONED: &str = "partitioned";
    pub const SCANNING: &str = "scanning";
    pub const AGGREGATING: &str = "aggregating";
    pub const PERSISTED: &str = "persisted";
    pub const DONE: &str = "done";
}
