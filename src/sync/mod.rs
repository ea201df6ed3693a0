// SPDX-License-Identifier: MIT

//! Shared-state primitives the worker pool coordinates through.

pub mod accumulator;
pub mod barrier;

pub use accumulator::{LockedAccumulator, PartialSlots};
pub use barrier::{BarrierWaitResult, CountingBarrier};
