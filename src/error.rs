// SPDX-License-Identifier: MIT

use std::sync::PoisonError;

use crate::partition::PartitionKind;
use crate::pools::workerpool::SyncKind;

/// Errors produced while validating or running a reduction.
///
/// None of these are recoverable mid-run: any failure discards the work done
/// so far and no partial result is handed back.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// A size or worker count is zero or above the configured maximum.
    #[error("invalid {what}: {value} (must be within 1..={max})")]
    InvalidDimension {
        what: &'static str,
        value: usize,
        max: usize,
    },
    /// The OS could not provision one of the requested worker threads.
    #[error("failed to spawn worker {worker}: {source}")]
    PoolCreation {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    /// A lock or barrier could not be acquired, or a worker died holding one.
    #[error("synchronization failure: {0}")]
    Synchronization(String),
    /// The partitioner cannot be driven by the requested strategy.
    #[error("{partition:?} partitioning cannot be combined with {sync:?}")]
    UnsupportedStrategy {
        partition: PartitionKind,
        sync: SyncKind,
    },
}

impl ReduceError {
    pub(crate) fn invalid(what: &'static str, value: usize, max: usize) -> Self {
        ReduceError::InvalidDimension { what, value, max }
    }
}

impl<G> From<PoisonError<G>> for ReduceError {
    fn from(_: PoisonError<G>) -> Self {
        ReduceError::Synchronization(
            "lock poisoned by a panicking worker".to_string(),
        )
    }
}

pub type Result<T> = std::result::Result<T, ReduceError>;
