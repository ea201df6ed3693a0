// SPDX-License-Identifier: MIT

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{ReduceError, Result};

/// Arrival bookkeeping shared by every participant.
#[derive(Debug)]
struct BarrierState {
    /// Participants that have arrived in the current generation.
    arrived: usize,
    /// Bumped by the last arrival of each generation.
    generation: u64,
    /// Set once the barrier can no longer complete.
    cancelled: bool,
}

/// Reusable counting barrier built from a mutex and a condition variable.
///
/// Blocks callers until `total_workers` have arrived. The last arrival resets
/// the count and wakes every waiter under the same lock, so the barrier can be
/// reused straight away for the next phase.
#[derive(Debug)]
pub struct CountingBarrier {
    /// Count of arrivals and the generation they belong to.
    state: Mutex<BarrierState>,
    /// Signalled when a generation completes or the barrier is cancelled.
    released: Condvar,
    /// Number of workers required to reach the barrier.
    total_workers: usize,
}

/// What a participant learns when it leaves the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    /// True for the arrival that released the generation.
    pub is_last: bool,
    /// The generation that was released.
    pub generation: u64,
}

impl CountingBarrier {
    /// Creates a barrier for `total_workers` participants.
    ///
    /// # Panics
    /// If `total_workers` is zero.
    pub fn new(total_workers: usize) -> Self {
        assert!(total_workers > 0, "a barrier needs at least one participant");
        CountingBarrier {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                cancelled: false,
            }),
            released: Condvar::new(),
            total_workers,
        }
    }

    // The state is only a pair of counters and stays consistent even if a
    // holder panicked, so poisoning is cleared rather than propagated.
    fn lock_state(&self) -> MutexGuard<'_, BarrierState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.state.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    /// Blocks until `total_workers` participants have called `wait`.
    ///
    /// # Returns
    /// - `Ok(result)` once the current generation is released.
    /// - `Err(ReduceError::Synchronization)` if the barrier was cancelled
    ///   before or while waiting.
    pub fn wait(&self) -> Result<BarrierWaitResult> {
        let mut state = self.lock_state();
        if state.cancelled {
            return Err(cancelled());
        }

        // Increment arrival count to signal that this worker has reached the
        // barrier.
        state.arrived += 1;
        let generation = state.generation;

        // The last arrival resets the count and releases everyone.
        if state.arrived == self.total_workers {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return Ok(BarrierWaitResult {
                is_last: true,
                generation,
            });
        }

        // Otherwise, wait for the generation to turn over.
        while state.generation == generation && !state.cancelled {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }

        if state.generation == generation {
            return Err(cancelled());
        }
        Ok(BarrierWaitResult {
            is_last: false,
            generation,
        })
    }

    /// Releases every current and future waiter with an error.
    ///
    /// Used when a participant will never arrive, e.g. because its thread
    /// could not be spawned.
    pub fn cancel(&self) {
        let mut state = self.lock_state();
        state.cancelled = true;
        self.released.notify_all();
    }
}

fn cancelled() -> ReduceError {
    ReduceError::Synchronization("barrier cancelled before all workers arrived".to_string())
}
