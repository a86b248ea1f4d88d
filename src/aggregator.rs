//! # Result Aggregator
//!
//! Single consumer of the shared result channel. Primes arrive in whatever
//! order the workers happen to find them; the aggregator buffers them until
//! every sender has been dropped, then imposes the final ascending order.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::error::{PrimeScanError, Result};

#[derive(Debug)]
pub struct ResultAggregator {
    receiver: UnboundedReceiver<u64>,
}

impl ResultAggregator {
    pub fn new(receiver: UnboundedReceiver<u64>) -> Self {
        Self { receiver }
    }

    /// Drain the channel until all producers are gone, then sort.
    ///
    /// The channel only reports exhaustion once every sender has been
    /// dropped, which is the "all workers done" barrier.
    pub async fn collect(mut self) -> Vec<u64> {
        let mut primes = Vec::new();
        while let Some(prime) = self.receiver.recv().await {
            primes.push(prime);
        }
        debug!(received = primes.len(), "Result channel closed, sorting");
        primes.sort_unstable();
        primes
    }
}

/// Check that `primes` is strictly increasing and strictly above `checkpoint`.
pub fn verify_sequence(checkpoint: Option<u64>, primes: &[u64]) -> Result<()> {
    if let (Some(previous), Some(&first)) = (checkpoint, primes.first()) {
        if first <= previous {
            return Err(PrimeScanError::OrderingViolation {
                previous,
                next: first,
            });
        }
    }
    match primes.windows(2).find(|pair| pair[0] >= pair[1]) {
        Some(pair) => Err(PrimeScanError::OrderingViolation {
            previous: pair[0],
            next: pair[1],
        }),
        None => Ok(()),
    }
}
