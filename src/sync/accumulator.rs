// SPDX-License-Identifier: MIT

use std::sync::{Mutex, OnceLock};

use crate::error::{ReduceError, Result};
use crate::field::Element;
use crate::reduce::PartialResult;

/// Global result guarded by a single mutex.
///
/// Workers merge under the lock in whatever order they acquire it. Sum, min
/// and max values do not depend on that order; the recorded position of a
/// tied extremum does.
#[derive(Debug)]
pub struct LockedAccumulator<T> {
    global: Mutex<PartialResult<T>>,
}

impl<T: Element> LockedAccumulator<T> {
    /// Starts from the empty result.
    pub fn new() -> Self {
        LockedAccumulator {
            global: Mutex::new(PartialResult::empty()),
        }
    }

    /// Merges a finished partial result into the global one.
    pub fn merge(&self, partial: &PartialResult<T>) -> Result<()> {
        let mut global = self.global.lock()?;
        global.merge(partial);
        Ok(())
    }

    /// Copy of the current global state.
    pub fn snapshot(&self) -> Result<PartialResult<T>> {
        Ok(*self.global.lock()?)
    }

    /// Consumes the accumulator once every worker has been joined.
    pub fn into_inner(self) -> Result<PartialResult<T>> {
        Ok(self.global.into_inner()?)
    }
}

impl<T: Element> Default for LockedAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One write-once slot per worker for the barrier strategy.
///
/// Worker `i` is the only writer of slot `i`, so publishing never contends.
/// The barrier orders every publish before the leader's reads.
#[derive(Debug)]
pub struct PartialSlots<T> {
    slots: Vec<OnceLock<PartialResult<T>>>,
}

impl<T: Element> PartialSlots<T> {
    /// Creates one empty slot per worker.
    pub fn new(worker_count: usize) -> Self {
        PartialSlots {
            slots: (0..worker_count).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Number of slots, one per worker.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for a pool of zero workers.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `partial` in `worker`'s slot.
    pub fn publish(&self, worker: usize, partial: PartialResult<T>) -> Result<()> {
        let slot = self.slots.get(worker).ok_or_else(|| {
            ReduceError::Synchronization(format!("no partial slot for worker {worker}"))
        })?;
        slot.set(partial).map_err(|_| {
            ReduceError::Synchronization(format!("worker {worker} published twice"))
        })
    }

    /// Combines every slot in ascending worker order.
    ///
    /// Fails if any worker has not published yet.
    pub fn combine(&self) -> Result<PartialResult<T>> {
        let mut total = PartialResult::empty();
        for (worker, slot) in self.slots.iter().enumerate() {
            let partial = slot.get().ok_or_else(|| {
                ReduceError::Synchronization(format!(
                    "worker {worker} passed the barrier without publishing"
                ))
            })?;
            total.merge(partial);
        }
        Ok(total)
    }
}
