//! # Range Partitioner
//!
//! Splits the span `[start, start + worker_count * batch_size)` into
//! `worker_count` contiguous, disjoint, half-open partitions of equal width,
//! in ascending order. Partition `i` covers
//! `[start + i * batch_size, start + (i + 1) * batch_size)`.
//!
//! All bounds are computed with checked arithmetic; a span that does not fit
//! in `u64` is rejected up front rather than wrapping during the scan.

use serde::{Deserialize, Serialize};

use crate::constants::FIRST_ODD_PRIME;
use crate::error::{PrimeScanError, Result};

/// Half-open range `[lo, hi)` owned by exactly one scan worker for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// Position of this partition in the run, 0-based
    pub index: usize,
    /// Inclusive lower bound
    pub lo: u64,
    /// Exclusive upper bound
    pub hi: u64,
}

impl Partition {
    pub fn width(&self) -> u64 {
        self.hi - self.lo
    }

    /// Whether this partition is the one responsible for emitting 2.
    ///
    /// Partitions ascend from index 0, so the lowest-indexed partition with
    /// `lo < 3` is the first one. It emits 2 even when its range stops short
    /// of 2, so a run from the origin always persists at least one prime.
    pub fn emits_even_prime(&self) -> bool {
        self.index == 0 && self.lo < FIRST_ODD_PRIME
    }

    /// Odd candidates worth testing, after the even-prime normalization.
    ///
    /// 2 itself is not yielded; callers check [`Partition::emits_even_prime`].
    pub fn odd_candidates(&self) -> OddCandidates {
        let mut next = self.lo.max(FIRST_ODD_PRIME);
        if next % 2 == 0 {
            // next <= u64::MAX - 1 since it is even, so this cannot overflow.
            next += 1;
        }
        OddCandidates {
            next: Some(next),
            hi: self.hi,
        }
    }
}

/// Iterator over the odd integers of a partition, stepping by two.
///
/// Terminates cleanly at the upper bound even when the next step would
/// exceed `u64::MAX`.
#[derive(Debug, Clone)]
pub struct OddCandidates {
    next: Option<u64>,
    hi: u64,
}

impl Iterator for OddCandidates {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next.filter(|&n| n < self.hi)?;
        self.next = current.checked_add(2);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(n) if n < self.hi => {
                let remaining = (self.hi - n).div_ceil(2);
                let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
                (remaining, Some(remaining))
            }
            _ => (0, Some(0)),
        }
    }
}

/// Assign `worker_count` partitions of width `batch_size` starting at `start`.
pub fn partition(start: u64, batch_size: u64, worker_count: usize) -> Result<Vec<Partition>> {
    if batch_size == 0 {
        return Err(PrimeScanError::InvalidParameter(
            "batch_size must be greater than zero".to_string(),
        ));
    }
    if worker_count == 0 {
        return Err(PrimeScanError::InvalidParameter(
            "worker_count must be greater than zero".to_string(),
        ));
    }

    let overflow = || PrimeScanError::RangeOverflow {
        start,
        batch_size,
        worker_count,
    };

    let span = u64::try_from(worker_count)
        .ok()
        .and_then(|count| count.checked_mul(batch_size))
        .ok_or_else(overflow)?;
    start.checked_add(span).ok_or_else(overflow)?;

    Ok((0..worker_count)
        .map(|index| {
            // Bounded by start + span, which was checked above.
            let lo = start + index as u64 * batch_size;
            Partition {
                index,
                lo,
                hi: lo + batch_size,
            }
        })
        .collect())
}

/// Exclusive upper bound of a run's covered span.
pub fn covered_end(partitions: &[Partition]) -> Option<u64> {
    partitions.last().map(|p| p.hi)
}
