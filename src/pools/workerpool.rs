// SPDX-License-Identifier: MIT

use std::sync::OnceLock;
use std::thread;

use tracing::{debug, info, trace};

use crate::config::{Limits, Variant};
use crate::error::{ReduceError, Result};
use crate::field::{Element, Field};
use crate::partition::{
    DynamicRowPartitioner, PartitionKind, StaticRangePartitioner, WorkAssignment,
};
use crate::reduce::{reduce, GlobalResult, PartialResult};
use crate::sync::{CountingBarrier, LockedAccumulator, PartialSlots};

/// Index of the worker that performs the cross-worker reduction after the
/// barrier.
pub const LEADER: usize = 0;

/// How partial results become the global result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Workers publish into their own slot, meet at a counting barrier, then
    /// the leader alone combines the slots in worker order.
    BarrierLeaderReduce,
    /// Workers merge each finished partial into a mutex-guarded global result.
    LockedAccumulate,
}

/// Callback invoked for every row handed out by the dynamic partitioner.
pub trait ClaimObserver: Sync {
    fn on_claim(&self, worker: usize, row: usize);
}

impl<F> ClaimObserver for F
where
    F: Fn(usize, usize) + Sync,
{
    fn on_claim(&self, worker: usize, row: usize) {
        self(worker, row)
    }
}

/// Observer that ignores every claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ClaimObserver for NoopObserver {
    fn on_claim(&self, _worker: usize, _row: usize) {}
}

/// Source of work assignments for one run.
enum Partitioner {
    Static(StaticRangePartitioner),
    Dynamic(DynamicRowPartitioner),
}

/// Shared state partial results flow into for one run.
enum Coordination<T> {
    Barrier {
        barrier: CountingBarrier,
        slots: PartialSlots<T>,
        /// Written by the leader once every slot is combined.
        combined: OnceLock<PartialResult<T>>,
    },
    Locked(LockedAccumulator<T>),
}

impl<T: Element> Coordination<T> {
    /// Wakes anyone parked at the barrier so a failed run can be joined.
    fn abort(&self) {
        if let Coordination::Barrier { barrier, .. } = self {
            barrier.cancel();
        }
    }

    fn into_partial(self) -> Result<PartialResult<T>> {
        match self {
            Coordination::Barrier { combined, .. } => {
                combined.into_inner().ok_or_else(|| {
                    ReduceError::Synchronization(
                        "leader finished without combining partials".to_string(),
                    )
                })
            }
            Coordination::Locked(accumulator) => accumulator.into_inner(),
        }
    }
}

/// Everything the workers of one run borrow.
struct RunState<'a, T, O> {
    field: &'a Field<T>,
    partitioner: Partitioner,
    coordination: Coordination<T>,
    observer: &'a O,
}

/// Cancels the barrier if its worker unwinds, so the others are not left
/// waiting for an arrival that will never come.
struct AbortOnUnwind<'s, T: Element>(&'s Coordination<T>);

impl<T: Element> Drop for AbortOnUnwind<'_, T> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

impl<T: Element, O: ClaimObserver> RunState<'_, T, O> {
    /// Body of worker `worker`: partition, reduce, then contribute.
    fn work(&self, worker: usize) -> Result<()> {
        let _guard = AbortOnUnwind(&self.coordination);
        let outcome = match (&self.partitioner, &self.coordination) {
            (Partitioner::Static(partitioner), coordination) => {
                let assignment = partitioner.assignment(worker);
                debug!(worker, rows = ?assignment.rows(), "worker started");
                let partial = reduce(self.field, &assignment);
                self.contribute(worker, partial, coordination)
            }
            (Partitioner::Dynamic(partitioner), Coordination::Locked(accumulator)) => {
                debug!(worker, "worker started");
                self.drain(worker, partitioner, accumulator)
            }
            (Partitioner::Dynamic(_), Coordination::Barrier { .. }) => {
                Err(ReduceError::UnsupportedStrategy {
                    partition: PartitionKind::Dynamic,
                    sync: SyncKind::BarrierLeaderReduce,
                })
            }
        };

        if outcome.is_err() {
            self.coordination.abort();
        }
        debug!(worker, ok = outcome.is_ok(), "worker finished");
        outcome
    }

    /// Hands a static partial to the active strategy.
    fn contribute(
        &self,
        worker: usize,
        partial: PartialResult<T>,
        coordination: &Coordination<T>,
    ) -> Result<()> {
        match coordination {
            Coordination::Barrier {
                barrier,
                slots,
                combined,
            } => {
                slots.publish(worker, partial)?;
                barrier.wait()?;

                // Every slot is filled once the barrier releases.
                if worker == LEADER {
                    let total = slots.combine()?;
                    info!(
                        sum = %total.sum,
                        rows = total.rows,
                        "leader combined {} partials",
                        slots.len()
                    );
                    combined.set(total).map_err(|_| {
                        ReduceError::Synchronization(
                            "leader combined partials twice".to_string(),
                        )
                    })?;
                }
                Ok(())
            }
            Coordination::Locked(accumulator) => accumulator.merge(&partial),
        }
    }

    /// Claims rows until none are left, merging each as it is reduced.
    fn drain(
        &self,
        worker: usize,
        partitioner: &DynamicRowPartitioner,
        accumulator: &LockedAccumulator<T>,
    ) -> Result<()> {
        let mut claimed = 0usize;
        while let Some(assignment) = partitioner.next_assignment()? {
            if let WorkAssignment::Row(row) = assignment {
                trace!(worker, row, "claimed row");
                self.observer.on_claim(worker, row);
            }
            let partial = reduce(self.field, &assignment);
            accumulator.merge(&partial)?;
            claimed += 1;
        }
        debug!(worker, claimed, "row counter exhausted");
        Ok(())
    }
}

/// A fixed number of worker threads that reduce a field together.
///
/// Threads are created at the start of each run and all joined before the
/// run returns. A run either yields a complete [`GlobalResult`] or an error.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    /// Number of worker threads per run.
    worker_count: usize,
    /// Bounds checked before any thread is spawned.
    limits: Limits,
}

impl WorkerPool {
    /// Creates a pool with `worker_count` workers, validated against `limits`.
    pub fn new(worker_count: usize, limits: &Limits) -> Result<Self> {
        Ok(WorkerPool {
            worker_count: limits.check_workers(worker_count)?,
            limits: *limits,
        })
    }

    /// Runs one of the three named variants.
    pub fn run_variant<T: Element>(
        &self,
        field: &Field<T>,
        variant: Variant,
    ) -> Result<GlobalResult<T>> {
        let (partition, sync) = variant.kinds();
        self.run(field, partition, sync)
    }

    /// Reduces `field` with the given partitioner and strategy.
    pub fn run<T: Element>(
        &self,
        field: &Field<T>,
        partition: PartitionKind,
        sync: SyncKind,
    ) -> Result<GlobalResult<T>> {
        self.run_observed(field, partition, sync, &NoopObserver)
    }

    /// Like [`WorkerPool::run`], reporting every dynamic row claim to
    /// `observer` from the claiming worker's thread.
    pub fn run_observed<T: Element, O: ClaimObserver>(
        &self,
        field: &Field<T>,
        partition: PartitionKind,
        sync: SyncKind,
        observer: &O,
    ) -> Result<GlobalResult<T>> {
        self.limits.check_size("row count", field.rows())?;
        self.limits.check_size("column count", field.cols())?;

        let partitioner = match (partition, sync) {
            (PartitionKind::Dynamic, SyncKind::BarrierLeaderReduce) => {
                return Err(ReduceError::UnsupportedStrategy { partition, sync });
            }
            (PartitionKind::Static, _) => Partitioner::Static(
                StaticRangePartitioner::new(self.worker_count, field.rows()),
            ),
            (PartitionKind::Dynamic, _) => {
                Partitioner::Dynamic(DynamicRowPartitioner::new(field.rows()))
            }
        };
        let coordination = match sync {
            SyncKind::BarrierLeaderReduce => Coordination::Barrier {
                barrier: CountingBarrier::new(self.worker_count),
                slots: PartialSlots::new(self.worker_count),
                combined: OnceLock::new(),
            },
            SyncKind::LockedAccumulate => {
                Coordination::Locked(LockedAccumulator::new())
            }
        };
        let state = RunState {
            field,
            partitioner,
            coordination,
            observer,
        };

        debug!(
            workers = self.worker_count,
            rows = field.rows(),
            cols = field.cols(),
            ?partition,
            ?sync,
            "starting reduction"
        );
        run_workers(&state, self.worker_count)?;

        let RunState {
            partitioner,
            coordination,
            ..
        } = state;
        if let Partitioner::Dynamic(partitioner) = &partitioner {
            debug_assert_eq!(partitioner.claimed()?, field.rows());
        }
        let partial = coordination.into_partial()?;
        let result = GlobalResult::from_partial(partial).ok_or_else(|| {
            ReduceError::Synchronization("no rows were reduced".to_string())
        })?;
        debug_assert_eq!(result.cells_processed, field.rows());

        info!(
            sum = %result.total_sum,
            min = ?result.min.value,
            max = ?result.max.value,
            cells_processed = result.cells_processed,
            "reduction complete"
        );
        Ok(result)
    }
}

/// Spawns `worker_count` scoped threads over `state` and joins them all.
///
/// Returns the first error seen: a failed spawn, a worker error, or a worker
/// panic.
fn run_workers<T: Element, O: ClaimObserver>(
    state: &RunState<'_, T, O>,
    worker_count: usize,
) -> Result<()> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(worker_count);
        let mut first_error = None;

        // Spawn workers, each with its index passed in explicitly.
        for worker in 0..worker_count {
            let spawned = thread::Builder::new()
                .name(format!("matrixsum-worker-{worker}"))
                .spawn_scoped(scope, move || state.work(worker));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    // Workers already parked at the barrier would never be
                    // released otherwise.
                    state.coordination.abort();
                    first_error = Some(ReduceError::PoolCreation { worker, source });
                    break;
                }
            }
        }

        // Join every spawned worker, even after a failure.
        for (worker, handle) in handles.into_iter().enumerate() {
            let outcome = handle.join().unwrap_or_else(|_| {
                Err(ReduceError::Synchronization(format!(
                    "worker {worker} panicked"
                )))
            });
            if let Err(error) = outcome {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    })
}

/// Reduces `field` with `worker_count` workers under the default [`Limits`].
pub fn run<T: Element>(
    worker_count: usize,
    field: &Field<T>,
    partition: PartitionKind,
    sync: SyncKind,
) -> Result<GlobalResult<T>> {
    WorkerPool::new(worker_count, &Limits::default())?.run(field, partition, sync)
}
