// SPDX-License-Identifier: MIT

use crate::error::{ReduceError, Result};
use crate::partition::PartitionKind;
use crate::pools::workerpool::SyncKind;

/// Default upper bound on the side length of a square field.
pub const DEFAULT_MAX_SIZE: usize = 10_000;

/// Default upper bound on the number of worker threads.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Upper bounds enforced on every field dimension and worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted row or column count.
    pub max_size: usize,
    /// Largest accepted worker count.
    pub max_workers: usize,
}

impl Limits {
    /// Creates custom limits. Both bounds must be at least one.
    pub fn new(max_size: usize, max_workers: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(ReduceError::invalid("maximum size", max_size, usize::MAX));
        }
        if max_workers == 0 {
            return Err(ReduceError::invalid(
                "maximum worker count",
                max_workers,
                usize::MAX,
            ));
        }
        Ok(Limits {
            max_size,
            max_workers,
        })
    }

    /// Checks a row or column count against `1..=max_size`.
    pub fn check_size(&self, what: &'static str, value: usize) -> Result<usize> {
        if value == 0 || value > self.max_size {
            return Err(ReduceError::invalid(what, value, self.max_size));
        }
        Ok(value)
    }

    /// Checks a worker count against `1..=max_workers`.
    pub fn check_workers(&self, value: usize) -> Result<usize> {
        if value == 0 || value > self.max_workers {
            return Err(ReduceError::invalid("worker count", value, self.max_workers));
        }
        Ok(value)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_size: DEFAULT_MAX_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// The three coordination disciplines a run can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Static row ranges, counting barrier, worker 0 reduces the partials.
    #[default]
    A,
    /// Static row ranges, each worker merges into a locked global result.
    B,
    /// Rows claimed one at a time from a shared counter, merged under a lock.
    C,
}

impl Variant {
    /// The (partitioner, strategy) pair this variant runs with.
    pub fn kinds(self) -> (PartitionKind, SyncKind) {
        match self {
            Variant::A => (PartitionKind::Static, SyncKind::BarrierLeaderReduce),
            Variant::B => (PartitionKind::Static, SyncKind::LockedAccumulate),
            Variant::C => (PartitionKind::Dynamic, SyncKind::LockedAccumulate),
        }
    }
}

/// Validated parameters for one run over a square field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Side length of the square field.
    pub size: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// Coordination discipline.
    pub variant: Variant,
    /// Bounds the other fields were validated against.
    pub limits: Limits,
}

impl RunConfig {
    /// Validates `size` and `workers` against `limits`.
    pub fn new(
        size: usize,
        workers: usize,
        variant: Variant,
        limits: Limits,
    ) -> Result<Self> {
        Ok(RunConfig {
            size: limits.check_size("matrix size", size)?,
            workers: limits.check_workers(workers)?,
            variant,
            limits,
        })
    }

    /// Clamps `size` and `workers` into `[1, max]` instead of rejecting them.
    pub fn clamped(
        size: usize,
        workers: usize,
        variant: Variant,
        limits: Limits,
    ) -> Self {
        RunConfig {
            size: size.clamp(1, limits.max_size),
            workers: workers.clamp(1, limits.max_workers),
            variant,
            limits,
        }
    }
}
