// SPDX-License-Identifier: MIT

//! Parallel sum, minimum and maximum over a dense integer matrix.
//!
//! A [`WorkerPool`] splits a [`Field`] between a fixed number of threads and
//! combines their [`PartialResult`]s in one of three ways:
//!
//! - [`Variant::A`]: static row strips, a [`CountingBarrier`], then worker 0
//!   combines every partial.
//! - [`Variant::B`]: static row strips, each merged into a
//!   [`LockedAccumulator`].
//! - [`Variant::C`]: rows claimed one at a time from a
//!   [`DynamicRowPartitioner`], each merged into a [`LockedAccumulator`].
//!
//! ```
//! use matrixsum::{Field, Limits, Variant, WorkerPool};
//!
//! let field = Field::new(4, 4, |row, col| (row * 4 + col) as i32)?;
//! let pool = WorkerPool::new(2, &Limits::default())?;
//! let result = pool.run_variant(&field, Variant::A)?;
//! assert_eq!(result.total_sum, 120);
//! assert_eq!(result.max.value, 15);
//! # Ok::<(), matrixsum::ReduceError>(())
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod partition;
pub mod pools;
pub mod reduce;
pub mod sync;

pub use config::{Limits, RunConfig, Variant};
pub use error::{ReduceError, Result};
pub use field::{CellPosition, Element, Field};
pub use partition::{
    DynamicRowPartitioner, PartitionKind, StaticRangePartitioner, WorkAssignment,
};
pub use pools::workerpool::{run, ClaimObserver, NoopObserver, SyncKind, WorkerPool};
pub use reduce::{reduce, Extremum, GlobalResult, PartialResult};
pub use sync::{CountingBarrier, LockedAccumulator, PartialSlots};
