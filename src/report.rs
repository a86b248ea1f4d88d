//! # Run Reports
//!
//! Observability output for a completed run. Nothing here feeds back into
//! the checkpoint; callers may print, serialize or ignore it.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::partition::Partition;

/// What one scan worker did with its partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub index: usize,
    pub lo: u64,
    pub hi: u64,
    pub candidates_tested: u64,
    pub primes_found: u64,
    pub cancelled: bool,
}

impl WorkerReport {
    pub fn new(partition: &Partition) -> Self {
        Self {
            index: partition.index,
            lo: partition.lo,
            hi: partition.hi,
            candidates_tested: 0,
            primes_found: 0,
            cancelled: false,
        }
    }
}

/// Summary of a persisted run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Resolved resume offset (inclusive)
    pub start: u64,
    /// End of the covered span (exclusive)
    pub end: u64,
    pub primes_found: usize,
    pub first_prime: Option<u64>,
    pub last_prime: Option<u64>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
}

impl RunReport {
    pub fn candidates_tested(&self) -> u64 {
        self.workers.iter().map(|w| w.candidates_tested).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} found {} primes in {:.3} seconds",
            self.start,
            self.end,
            self.primes_found,
            self.elapsed.as_secs_f64()
        )
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            start: 98,
            end: 198,
            primes_found: 20,
            first_prime: Some(101),
            last_prime: Some(197),
            elapsed: Duration::from_millis(1_500),
            workers: vec![WorkerReport {
                index: 0,
                lo: 98,
                hi: 198,
                candidates_tested: 50,
                primes_found: 20,
                cancelled: false,
            }],
        }
    }

    #[test]
    fn test_display_matches_summary_line() {
        assert_eq!(sample().to_string(), "98-198 found 20 primes in 1.500 seconds");
    }

    #[test]
    fn test_json_uses_fractional_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["elapsed"], serde_json::json!(1.5));
        assert_eq!(json["workers"][0]["primes_found"], serde_json::json!(20));

        let back: RunReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.elapsed, Duration::from_millis(1_500));
        assert_eq!(back.candidates_tested(), 50);
    }
}
